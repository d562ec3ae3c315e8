use std::fmt::Display;

use error_stack::Context;

use crate::entity::{Stock, StockId, StockQuantity, StockUpdate};

/// Failure of a single call to the stock service.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TransportError {
    Timeout,
    Connection,
    /// The service answered with a non-2xx status.
    Status(u16),
    /// The service answered 2xx but the body could not be read as a stock record.
    Decode,
}

impl TransportError {
    /// Whether another attempt may succeed: timeouts, connection failures,
    /// 5xx and 429 are transient, any other answer is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Timeout | TransportError::Connection => true,
            TransportError::Status(code) => *code == 429 || (500..600).contains(code),
            TransportError::Decode => false,
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "Stock service timed out"),
            TransportError::Connection => write!(f, "Could not connect to stock service"),
            TransportError::Status(code) => write!(f, "Stock service responded with {code}"),
            TransportError::Decode => write!(f, "Malformed stock service response"),
        }
    }
}

impl Context for TransportError {}

#[async_trait::async_trait]
pub trait StockClient: 'static + Sync + Send {
    async fn fetch(&self, id: &StockId) -> error_stack::Result<Stock, TransportError>;
    async fn create(
        &self,
        initial_quantity: &StockQuantity,
    ) -> error_stack::Result<Stock, TransportError>;
    async fn apply_update(
        &self,
        id: &StockId,
        update: &StockUpdate,
    ) -> error_stack::Result<Stock, TransportError>;
}

pub trait DependOnStockClient: 'static + Sync + Send {
    type StockClient: StockClient;
    fn stock_client(&self) -> &Self::StockClient;
}
