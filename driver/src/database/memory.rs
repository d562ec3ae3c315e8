use std::collections::HashMap;

use kernel::interface::repository::BookRepository;
use kernel::prelude::entity::{Book, BookId, BookStatus};
use kernel::KernelError;
use tokio::sync::RwLock;

/// Process-local book store.
#[derive(Default)]
pub struct InMemoryBookRepository {
    books: RwLock<HashMap<BookId, Book>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn title_of(book: &Book) -> &str {
    let title: &String = book.title().as_ref();
    title
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn find(&self, id: &BookId) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(self.books.read().await.get(id).cloned())
    }

    async fn save(&self, book: Book) -> error_stack::Result<Book, KernelError> {
        self.books
            .write()
            .await
            .insert(book.id().clone(), book.clone());
        Ok(book)
    }

    async fn delete(&self, id: &BookId) -> error_stack::Result<(), KernelError> {
        if self.books.write().await.remove(id).is_none() {
            tracing::debug!("Book {id} was already absent");
        }
        Ok(())
    }

    async fn get_by_status(
        &self,
        status: &BookStatus,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let books = self.books.read().await;
        let mut found = books
            .values()
            .filter(|book| book.status() == status)
            .cloned()
            .collect::<Vec<_>>();
        found.sort_by(|a, b| title_of(a).cmp(title_of(b)));
        Ok(found)
    }
}
