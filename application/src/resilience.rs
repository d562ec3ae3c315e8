mod breaker;
mod policy;
mod retry;

pub use self::{breaker::*, policy::*, retry::*};
