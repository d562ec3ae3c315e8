use application::lookup::{DependOnStockLookup, ResilientStockLookup};
use driver::client::{HttpStockClient, StockServiceConfig};
use driver::database::InMemoryBookRepository;
use kernel::interface::client::DependOnStockClient;
use kernel::interface::repository::DependOnBookRepository;
use kernel::KernelError;
use std::ops::Deref;
use std::sync::Arc;
use vodca::References;

use crate::config::resilience_from_env;

#[derive(Clone)]
pub struct AppModule(Arc<Handler>);

impl AppModule {
    pub fn new() -> error_stack::Result<Self, KernelError> {
        Ok(Self(Arc::new(Handler::init()?)))
    }
}

impl Deref for AppModule {
    type Target = Handler;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

#[derive(References)]
pub struct Handler {
    books: InMemoryBookRepository,
    stock: ResilientStockLookup<HttpStockClient>,
}

impl Handler {
    pub fn init() -> error_stack::Result<Self, KernelError> {
        let client = HttpStockClient::new(StockServiceConfig::from_env()?)?;
        let stock = ResilientStockLookup::from_config(client, resilience_from_env()?);
        tracing::debug!(breaker = ?stock.breaker().config(), "stock lookup ready");

        Ok(Self {
            books: InMemoryBookRepository::new(),
            stock,
        })
    }
}

impl DependOnBookRepository for AppModule {
    type BookRepository = InMemoryBookRepository;
    fn book_repository(&self) -> &Self::BookRepository {
        self.books()
    }
}

impl DependOnStockClient for AppModule {
    type StockClient = HttpStockClient;
    fn stock_client(&self) -> &Self::StockClient {
        self.stock().client()
    }
}

impl DependOnStockLookup for AppModule {
    type StockLookup = ResilientStockLookup<HttpStockClient>;
    fn stock_lookup(&self) -> &Self::StockLookup {
        self.stock()
    }
}
