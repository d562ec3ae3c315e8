use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use error_stack::Report;
use kernel::interface::client::{DependOnStockClient, StockClient, TransportError};
use kernel::interface::repository::{BookRepository, DependOnBookRepository};
use kernel::prelude::entity::{Book, BookId, BookStatus, Stock, StockId, StockQuantity, StockUpdate};
use kernel::KernelError;

use crate::lookup::{DependOnStockLookup, ResilientStockLookup};
use crate::resilience::ResilienceConfig;

/// Stock client answering from a script, then with a fixed answer.
pub struct FakeStockClient {
    script: Mutex<VecDeque<Result<Stock, TransportError>>>,
    answer: Result<Stock, TransportError>,
    latency: Duration,
    pub fetches: AtomicUsize,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
}

impl FakeStockClient {
    pub fn answering(answer: Result<Stock, TransportError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            answer,
            latency: Duration::ZERO,
            fetches: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    pub fn with_script(
        self,
        script: impl IntoIterator<Item = Result<Stock, TransportError>>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..self
        }
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        Self { latency, ..self }
    }

    pub fn calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
            + self.creates.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
    }

    async fn respond(&self) -> error_stack::Result<Stock, TransportError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| self.answer.clone());
        next.map_err(Report::new)
    }
}

#[async_trait::async_trait]
impl StockClient for FakeStockClient {
    async fn fetch(&self, _id: &StockId) -> error_stack::Result<Stock, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.respond().await
    }

    async fn create(
        &self,
        _initial_quantity: &StockQuantity,
    ) -> error_stack::Result<Stock, TransportError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.respond().await
    }

    async fn apply_update(
        &self,
        _id: &StockId,
        _update: &StockUpdate,
    ) -> error_stack::Result<Stock, TransportError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.respond().await
    }
}

#[derive(Default)]
pub struct FakeBookRepository {
    books: Mutex<HashMap<BookId, Book>>,
    pub calls: AtomicUsize,
}

impl FakeBookRepository {
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        Self {
            books: Mutex::new(
                books
                    .into_iter()
                    .map(|book| (book.id().clone(), book))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn stored(&self, id: &BookId) -> Option<Book> {
        self.books.lock().expect("books lock").get(id).cloned()
    }
}

#[async_trait::async_trait]
impl BookRepository for FakeBookRepository {
    async fn find(&self, id: &BookId) -> error_stack::Result<Option<Book>, KernelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.stored(id))
    }

    async fn save(&self, book: Book) -> error_stack::Result<Book, KernelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.books
            .lock()
            .expect("books lock")
            .insert(book.id().clone(), book.clone());
        Ok(book)
    }

    async fn delete(&self, id: &BookId) -> error_stack::Result<(), KernelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.books.lock().expect("books lock").remove(id);
        Ok(())
    }

    async fn get_by_status(
        &self,
        status: &BookStatus,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .books
            .lock()
            .expect("books lock")
            .values()
            .filter(|book| book.status() == status)
            .cloned()
            .collect())
    }
}

/// Dependency module wiring the fakes together the way the server wires the real ones.
pub struct FakeModule {
    pub repository: FakeBookRepository,
    pub lookup: ResilientStockLookup<FakeStockClient>,
}

impl FakeModule {
    pub fn new(repository: FakeBookRepository, client: FakeStockClient) -> Self {
        Self {
            repository,
            lookup: ResilientStockLookup::from_config(client, ResilienceConfig::default()),
        }
    }

    pub fn client(&self) -> &FakeStockClient {
        self.lookup.client()
    }
}

impl DependOnBookRepository for FakeModule {
    type BookRepository = FakeBookRepository;
    fn book_repository(&self) -> &Self::BookRepository {
        &self.repository
    }
}

impl DependOnStockClient for FakeModule {
    type StockClient = FakeStockClient;
    fn stock_client(&self) -> &Self::StockClient {
        self.lookup.client()
    }
}

impl DependOnStockLookup for FakeModule {
    type StockLookup = ResilientStockLookup<FakeStockClient>;
    fn stock_lookup(&self) -> &Self::StockLookup {
        &self.lookup
    }
}
