//! # Repository Module
//!
//! Database repository implementations for the sale ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Coordinator (vendo-ledger)                                             │
//! │       │                                                                 │
//! │       │  let mut tx = db.begin().await?;                                │
//! │       │  db.products().decrement_stock(&mut *tx, id, field, qty)        │
//! │       │  db.movements().append(&mut *tx, &movement)                     │
//! │       │  tx.commit().await?;                                            │
//! │       ▼                                                                 │
//! │  Repositories: SQL lives here and only here                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Write methods take an `Executor`, so the caller decides whether they run
//! on the pool or inside its transaction.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Lookups and conditional stock updates
//! - [`SaleRepository`](sale::SaleRepository) - Sales and sale items
//! - [`StockMovementRepository`](stock_movement::StockMovementRepository) - Stock ledger
//! - [`ActivityLogRepository`](activity_log::ActivityLogRepository) - Business events

pub mod activity_log;
pub mod product;
pub mod sale;
pub mod stock_movement;
