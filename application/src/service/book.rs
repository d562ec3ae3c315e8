use error_stack::Report;
use uuid::Uuid;

use kernel::interface::client::{DependOnStockClient, StockClient};
use kernel::interface::repository::{BookRepository, DependOnBookRepository};
use kernel::prelude::entity::{
    Book, BookId, BookStatus, BookSummary, BookTitle, BookYear, StockQuantity, StockUpdate,
};
use kernel::KernelError;

use crate::service::BookAggregator;
use crate::transfer::{
    BookDto, CreateBookDto, DeleteBookDto, GetBookDto, UpdateBookDto, UpdateStockDto,
};

/// Quantity requested from the stock service for every new book.
pub const DEFAULT_INITIAL_QUANTITY: u32 = 10;

fn validate(
    title: Option<String>,
    summary: Option<String>,
    year: Option<i32>,
) -> error_stack::Result<(BookTitle, BookSummary, BookYear), KernelError> {
    let title = BookTitle::parse(title)
        .ok_or_else(|| Report::new(KernelError::Validation).attach_printable("Title is required"))?;
    let summary = BookSummary::parse(summary).ok_or_else(|| {
        Report::new(KernelError::Validation).attach_printable("Summary is required")
    })?;
    let year =
        year.ok_or_else(|| Report::new(KernelError::Validation).attach_printable("Year is required"))?;
    Ok((title, summary, BookYear::new(year)))
}

async fn find_existing<R: BookRepository>(
    repository: &R,
    id: Uuid,
) -> error_stack::Result<Book, KernelError> {
    repository.find(&BookId::new(id)).await?.ok_or_else(|| {
        Report::new(KernelError::NotFound).attach_printable(format!("Book {id} not found"))
    })
}

#[async_trait::async_trait]
pub trait GetBookService:
    'static + Sync + Send + DependOnBookRepository + BookAggregator
{
    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<BookDto, KernelError> {
        let book = find_existing(self.book_repository(), dto.id).await?;
        let book = self.enrich(book).await;
        Ok(BookDto::from(book))
    }

    async fn get_active_books(&self) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let books = self
            .book_repository()
            .get_by_status(&BookStatus::Active)
            .await?;
        let books = self.enrich_all(books).await;
        Ok(books.into_iter().map(BookDto::from).collect())
    }
}

impl<T> GetBookService for T where T: DependOnBookRepository + BookAggregator {}

#[async_trait::async_trait]
pub trait CreateBookService:
    'static + Sync + Send + DependOnBookRepository + DependOnStockClient
{
    async fn create_book(&self, dto: CreateBookDto) -> error_stack::Result<BookDto, KernelError> {
        let (title, summary, year) = validate(dto.title, dto.summary, dto.year)?;

        let initial = StockQuantity::new(DEFAULT_INITIAL_QUANTITY);
        let stock = match self.stock_client().create(&initial).await {
            Ok(stock) => Some(stock),
            Err(report) => {
                tracing::warn!("Creating book without stock: {report:?}");
                None
            }
        };

        let book = Book::new(
            BookId::generate(),
            title,
            summary,
            year,
            dto.status.unwrap_or_default(),
            stock,
        );
        let saved = self.book_repository().save(book).await?;
        Ok(BookDto::from(saved))
    }
}

impl<T> CreateBookService for T where T: DependOnBookRepository + DependOnStockClient {}

#[async_trait::async_trait]
pub trait UpdateBookService: 'static + Sync + Send + DependOnBookRepository {
    async fn update_book(&self, dto: UpdateBookDto) -> error_stack::Result<BookDto, KernelError> {
        let (title, summary, year) = validate(dto.title, dto.summary, dto.year)?;
        let mut book = find_existing(self.book_repository(), dto.id).await?;
        book.substitute(|book| {
            *book.title = title;
            *book.summary = summary;
            *book.year = year;
            if let Some(status) = dto.status {
                *book.status = status;
            }
        });
        let saved = self.book_repository().save(book).await?;
        Ok(BookDto::from(saved))
    }
}

impl<T> UpdateBookService for T where T: DependOnBookRepository {}

#[async_trait::async_trait]
pub trait UpdateStockService:
    'static + Sync + Send + DependOnBookRepository + DependOnStockClient
{
    /// Forwards the update to the stock service. The returned book carries the
    /// new snapshot on success; the stored record is not touched.
    async fn update_stock(&self, dto: UpdateStockDto) -> error_stack::Result<BookDto, KernelError> {
        let mut book = find_existing(self.book_repository(), dto.id).await?;
        let Some(stock_id) = book.stock_id().cloned() else {
            return Ok(BookDto::from(book));
        };

        let update = StockUpdate::new(dto.quantity);
        match self.stock_client().apply_update(&stock_id, &update).await {
            Ok(stock) => {
                book.substitute(|book| *book.stock = Some(stock));
            }
            Err(report) => {
                tracing::warn!("Stock of book {} not updated: {report:?}", dto.id);
            }
        }
        Ok(BookDto::from(book))
    }
}

impl<T> UpdateStockService for T where T: DependOnBookRepository + DependOnStockClient {}

#[async_trait::async_trait]
pub trait DeleteBookService: 'static + Sync + Send + DependOnBookRepository {
    async fn delete_book(&self, dto: DeleteBookDto) -> error_stack::Result<(), KernelError> {
        self.book_repository().delete(&BookId::new(dto.id)).await
    }
}

impl<T> DeleteBookService for T where T: DependOnBookRepository {}
