mod id;
mod status;
mod summary;
mod title;
mod year;

pub use self::{id::*, status::*, summary::*, title::*, year::*};
use crate::entity::Stock;
use destructure::{Destructure, Mutation};
use vodca::References;

/// A catalog record. `stock` is only a cached snapshot of the stock service's
/// record; the catalog never owns its lifecycle.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    summary: BookSummary,
    year: BookYear,
    status: BookStatus,
    stock: Option<Stock>,
}

impl Book {
    pub fn new(
        id: BookId,
        title: BookTitle,
        summary: BookSummary,
        year: BookYear,
        status: BookStatus,
        stock: Option<Stock>,
    ) -> Self {
        Self {
            id,
            title,
            summary,
            year,
            status,
            stock,
        }
    }

    pub fn stock_id(&self) -> Option<&crate::entity::StockId> {
        self.stock.as_ref().map(Stock::id)
    }
}
