//! # vendo-core: Pure Domain Logic for the Vendo Sale Ledger
//!
//! Everything the sale and reversal coordinators need to decide, with no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vendo Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    vendo-api (axum)                             │   │
//! │  │    POST /sales   DELETE /sales/{id}   GET /activity-logs        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vendo-ledger                                 │   │
//! │  │    SaleProcessor, SaleReversal, RevenueReporter                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vendo-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │  stock  │ │ currency │ │  cart  │  │   │
//! │  │   │ Product │ │  Money  │ │ resolver│ │  unify   │ │validate│  │   │
//! │  │   │  Sale   │ │         │ │  slot   │ │  tax     │ │ totals │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vendo-db (SQLite)                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem, StockMovement, ActivityLog)
//! - [`money`] - Integer minor-unit money
//! - [`stock`] - Stock representation resolver
//! - [`currency`] - Currency & tax normalizer
//! - [`cart`] - Create-sale payload and total reconciliation
//! - [`validation`] - Field validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use vendo_core::currency::{apply_tax, unify, ExchangeRate, TaxRate};
//! use vendo_core::{Currency, Money};
//!
//! let items = [
//!     (Currency::Htg, Money::from_cents(100_000)),
//!     (Currency::Usd, Money::from_cents(1_000)),
//! ];
//! let rate = ExchangeRate::new(Decimal::from(132)).unwrap();
//! let totals = unify(&items, rate, Currency::Htg);
//!
//! let tax = TaxRate::from_percent(Decimal::from(10)).unwrap();
//! assert_eq!(apply_tax(totals.unified_total, tax), Decimal::from(2552));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod currency;
pub mod error;
pub mod money;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, Discount};
pub use currency::{apply_tax, unify, CurrencyAmount, ExchangeRate, TaxRate, UnifiedTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use stock::{StockField, StockSlot};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity on a single cart line.
///
/// Hardware stock (bars, boxes) moves in larger counts than retail units.
pub const MAX_ITEM_QUANTITY: i64 = 10_000;

/// Largest price or total accepted, in minor units (one trillion major units).
///
/// With [`MAX_ITEM_QUANTITY`] and [`MAX_CART_ITEMS`] this keeps every line
/// and cart product inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000_000;

/// Maximum length of the customer name on a sale.
pub const MAX_CUSTOMER_NAME_LEN: usize = 200;

/// Entity type recorded on sale activity entries.
pub const ENTITY_SALE: &str = "sale";

/// Entity type recorded on product activity entries.
pub const ENTITY_PRODUCT: &str = "product";

/// Reason recorded on out-movements written by a sale.
pub const REASON_SALE: &str = "sale";

/// Reason recorded on in-movements written by a reversal.
pub const REASON_RESTORATION: &str = "restoration";
