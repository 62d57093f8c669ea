//! Route handlers, one module per resource.

pub mod activity;
pub mod health;
pub mod reports;
pub mod sales;

#[cfg(test)]
pub(crate) mod testing;
