mod admin;
mod book;

pub use self::{admin::*, book::*};
