mod aggregate;
mod book;

pub use self::{aggregate::*, book::*};
