//! # Stock Representation Resolver
//!
//! Products keep their availability in one of three counters. Which one is
//! authoritative depends on the category, with a legacy fallback for
//! products whose bars were recorded under the wrong category.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. category = ceramic AND stock_boite set   → stock_boite              │
//! │  2. category = iron    AND stock_barre set   → stock_barre              │
//! │  3. stock_barre set AND stock_barre > 0      → stock_barre  (legacy)    │
//! │  4. otherwise                                → quantity                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sale path (decrement) and the reversal path (increment) both go
//! through [`StockSlot`]. A sale records the column it decremented on its
//! stock movement; the reversal reads it back with [`StockField::from_str`]
//! and restores onto that same counter through [`StockSlot::on`], even if
//! resolution would now pick a different one (a legacy bar count sold down
//! to zero, for instance).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Product, ProductCategory};

// =============================================================================
// Stock Field
// =============================================================================

/// One of the three stock counters on a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockField {
    Quantity,
    StockBarre,
    StockBoite,
}

impl StockField {
    /// Picks the authoritative counter for a product.
    ///
    /// ```rust
    /// use vendo_core::stock::StockField;
    /// # use vendo_core::types::{Product, ProductCategory};
    /// # let product = Product {
    /// #     id: "p".into(), name: "Fer 12".into(), category: ProductCategory::Iron,
    /// #     quantity: 0, stock_barre: Some(100), stock_boite: None,
    /// #     purchase_price_cents: 0, alert_threshold: 0,
    /// #     created_at: chrono::Utc::now(), updated_at: chrono::Utc::now(),
    /// # };
    /// assert_eq!(StockField::resolve(&product), StockField::StockBarre);
    /// ```
    pub fn resolve(product: &Product) -> StockField {
        match (&product.category, product.stock_boite, product.stock_barre) {
            (ProductCategory::Ceramic, Some(_), _) => StockField::StockBoite,
            (ProductCategory::Iron, _, Some(_)) => StockField::StockBarre,
            (_, _, Some(barre)) if barre > 0 => StockField::StockBarre,
            _ => StockField::Quantity,
        }
    }

    /// Storage column holding this counter.
    ///
    /// Only ever one of three static names, so it is safe to splice into SQL.
    pub const fn column(&self) -> &'static str {
        match self {
            StockField::Quantity => "quantity",
            StockField::StockBarre => "stock_barre",
            StockField::StockBoite => "stock_boite",
        }
    }

    /// Human-readable unit name for log lines and activity descriptions.
    pub const fn label(&self) -> &'static str {
        match self {
            StockField::Quantity => "units",
            StockField::StockBarre => "bars",
            StockField::StockBoite => "boxes",
        }
    }

    /// Current value of this counter on the product. Unset counters read as 0.
    pub fn read(&self, product: &Product) -> i64 {
        match self {
            StockField::Quantity => product.quantity,
            StockField::StockBarre => product.stock_barre.unwrap_or(0),
            StockField::StockBoite => product.stock_boite.unwrap_or(0),
        }
    }
}

impl fmt::Display for StockField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Parses a storage column name, as recorded on stock movements.
impl FromStr for StockField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quantity" => Ok(StockField::Quantity),
            "stock_barre" => Ok(StockField::StockBarre),
            "stock_boite" => Ok(StockField::StockBoite),
            other => Err(ValidationError::InvalidFormat {
                field: "stockField".to_string(),
                reason: format!("unknown stock column '{other}'"),
            }),
        }
    }
}

// =============================================================================
// Stock Slot
// =============================================================================

/// The resolved stock accessor for one product: which counter, and its value
/// when the product was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockSlot {
    pub field: StockField,
    pub current: i64,
}

impl StockSlot {
    /// Resolves the slot for a product.
    pub fn of(product: &Product) -> StockSlot {
        let field = StockField::resolve(product);
        StockSlot {
            field,
            current: field.read(product),
        }
    }

    /// Slot on an explicit counter, bypassing resolution.
    pub fn on(product: &Product, field: StockField) -> StockSlot {
        StockSlot {
            field,
            current: field.read(product),
        }
    }

    /// Fails with `InsufficientStock` when `requested` exceeds the counter.
    pub fn check(&self, product_id: &str, requested: i64) -> CoreResult<()> {
        if requested > self.current {
            return Err(CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                requested,
                available: self.current,
            });
        }
        Ok(())
    }

    /// Counter value after selling `quantity`.
    #[inline]
    pub const fn after_sale(&self, quantity: i64) -> i64 {
        self.current - quantity
    }

    /// Counter value after restoring `quantity`.
    #[inline]
    pub const fn after_restore(&self, quantity: i64) -> i64 {
        self.current + quantity
    }
}
