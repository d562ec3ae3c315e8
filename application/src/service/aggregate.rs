use futures::future::join_all;
use kernel::prelude::entity::Book;

use crate::lookup::{DependOnStockLookup, StockLookup};

/// Attaches the current stock to books on their way out. A book whose stock
/// cannot be read keeps whatever snapshot it already had.
#[async_trait::async_trait]
pub trait BookAggregator: 'static + Sync + Send + DependOnStockLookup {
    async fn enrich(&self, mut book: Book) -> Book {
        let Some(stock_id) = book.stock_id().cloned() else {
            return book;
        };
        if let Some(stock) = self.stock_lookup().fetch(&stock_id).await {
            book.substitute(|book| *book.stock = Some(stock));
        }
        book
    }

    async fn enrich_all(&self, books: Vec<Book>) -> Vec<Book> {
        join_all(books.into_iter().map(|book| self.enrich(book))).await
    }
}

impl<T> BookAggregator for T where T: DependOnStockLookup {}
