//! # vendo-ledger: Sale Transaction & Reversal Engine
//!
//! Coordinators that turn a cart into a committed sale and a sale back into
//! stock. Each operation owns exactly one SQLite transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  vendo-api  ──►  ★ vendo-ledger ★  ──►  vendo-db  ──►  SQLite          │
//! │                        │                                                │
//! │                        └──►  vendo-core (stock resolver, normalizer)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`processor`] - `SaleProcessor::create_sale`
//! - [`reversal`] - `SaleReversal::delete_sale`
//! - [`reports`] - Normalizer-backed revenue figures
//! - [`activity`] - Activity log entries the engine writes
//! - [`config`] - Exchange rate, display currency, tax rate
//! - [`error`] - `LedgerError` with machine codes
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rust_decimal::Decimal;
//! use vendo_core::{Actor, Cart, Currency, ExchangeRate, Role, TaxRate};
//! use vendo_db::{Database, DbConfig};
//! use vendo_ledger::{LedgerConfig, SaleProcessor, SaleReversal};
//!
//! # async fn example(cart: Cart) -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DbConfig::new("./vendo.db")).await?;
//! let config = LedgerConfig::new(
//!     ExchangeRate::new(Decimal::from(132))?,
//!     Currency::Htg,
//!     TaxRate::zero(),
//! );
//!
//! let sale = SaleProcessor::new(db.clone(), config)
//!     .create_sale(&Actor::new("seller-1", Role::Seller), cart)
//!     .await?;
//!
//! let summary = SaleReversal::new(db)
//!     .delete_sale(&Actor::new("admin-1", Role::Admin), &sale.id)
//!     .await?;
//! println!("restored {} products", summary.restored_products);
//! # Ok(())
//! # }
//! ```

pub mod activity;
pub mod config;
pub mod error;
pub mod processor;
pub mod reports;
pub mod reversal;

#[cfg(test)]
mod test_support;

pub use activity::ActivityRecorder;
pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use processor::SaleProcessor;
pub use reports::{RevenueReport, RevenueReporter, SaleTotals};
pub use reversal::{RestoreSummary, SaleReversal, SkippedRestore};
