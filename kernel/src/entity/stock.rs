mod id;
mod quantity;
mod update;

pub use self::{id::*, quantity::*, update::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References, Destructure)]
pub struct Stock {
    id: StockId,
    quantity: StockQuantity,
}

impl Stock {
    pub fn new(id: StockId, quantity: StockQuantity) -> Self {
        Self { id, quantity }
    }
}
