use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct StockQuantity(u32);

impl StockQuantity {
    pub fn new(quantity: impl Into<u32>) -> Self {
        Self(quantity.into())
    }
}
