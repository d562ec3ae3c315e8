use serde::{Deserialize, Serialize};
use vodca::References;

/// Quantity submitted to the stock service. Whether it is read as a delta or a
/// target is up to the stock service.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References)]
pub struct StockUpdate {
    quantity: i32,
}

impl StockUpdate {
    pub fn new(quantity: impl Into<i32>) -> Self {
        Self {
            quantity: quantity.into(),
        }
    }
}
