use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct StockId(i64);

impl StockId {
    pub fn new(id: impl Into<i64>) -> Self {
        Self(id.into())
    }
}
