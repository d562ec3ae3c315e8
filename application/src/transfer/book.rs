use uuid::Uuid;

use kernel::prelude::entity::{Book, BookStatus, DestructBook, DestructStock, Stock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDto {
    pub id: i64,
    pub quantity: u32,
}

impl From<Stock> for StockDto {
    fn from(value: Stock) -> Self {
        let DestructStock { id, quantity } = value.into_destruct();
        Self {
            id: id.into(),
            quantity: quantity.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub year: i32,
    pub status: BookStatus,
    pub stock: Option<StockDto>,
}

impl From<Book> for BookDto {
    fn from(value: Book) -> Self {
        let DestructBook {
            id,
            title,
            summary,
            year,
            status,
            stock,
        } = value.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            summary: summary.into(),
            year: year.into(),
            status,
            stock: stock.map(StockDto::from),
        }
    }
}

pub struct GetBookDto {
    pub id: Uuid,
}

pub struct CreateBookDto {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub year: Option<i32>,
    pub status: Option<BookStatus>,
}

pub struct UpdateBookDto {
    pub id: Uuid,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub year: Option<i32>,
    pub status: Option<BookStatus>,
}

pub struct UpdateStockDto {
    pub id: Uuid,
    pub quantity: i32,
}

pub struct DeleteBookDto {
    pub id: Uuid,
}
