mod book;
mod stock;

pub use self::{book::*, stock::*};
