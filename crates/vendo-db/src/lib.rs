//! # vendo-db: Database Layer for the Vendo Sale Ledger
//!
//! SQLite access through sqlx: pool, embedded migrations and repositories.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  vendo-ledger (SaleProcessor / SaleReversal)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vendo-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                    │  │ (embedded) │  │   │
//! │  │   │               │    │ ProductRepository  │  │            │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepository     │  │ 001_init   │  │   │
//! │  │   │ begin() → tx  │    │ StockMovementRepo  │  │            │  │   │
//! │  │   │               │    │ ActivityLogRepo    │  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vendo_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./vendo.db")).await?;
//!
//! let mut tx = db.begin().await?;
//! let product = db.products().find_by_id(&mut *tx, "prod-1").await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::activity_log::{ActivityLogFilter, ActivityLogPage, ActivityLogRepository};
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock_movement::StockMovementRepository;

// sqlx transaction type used by callers that coordinate several repositories.
pub use sqlx::{Sqlite, Transaction};
