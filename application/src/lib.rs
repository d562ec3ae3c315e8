pub mod lookup;
pub mod resilience;
pub mod service;
pub mod transfer;

#[cfg(test)]
pub(crate) mod fake;
