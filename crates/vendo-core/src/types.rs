//! # Domain Types
//!
//! Core domain types used throughout Vendo.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  category       │   │  seller_id      │   │  sale_id (FK)   │       │
//! │  │  quantity       │   │  customer_name  │   │  product_id     │       │
//! │  │  stock_barre    │   │  discount_*     │   │  currency       │       │
//! │  │  stock_boite    │   │  total_cents    │   │  profit_amount  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  StockMovement  │   │   ActivityLog   │   Both append-only.         │
//! │  │  ─────────────  │   │  ─────────────  │   History is never          │
//! │  │  in / out       │   │  action_type    │   deleted; a reversal adds  │
//! │  │  previous → new │   │  metadata JSON  │   compensating rows.        │
//! │  │  sale_id (null) │   │  actor (null)   │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Currency
// =============================================================================

/// The two currencies a line item can be priced in.
///
/// HTG is the local currency; USD is the secondary one. Conversions between
/// them always go through the normalizer in [`crate::currency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum Currency {
    Htg,
    Usd,
}

impl Currency {
    /// Returns true for the local currency.
    #[inline]
    pub const fn is_local(&self) -> bool {
        matches!(self, Currency::Htg)
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Htg => "HTG",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HTG" => Ok(Currency::Htg),
            "USD" => Ok(Currency::Usd),
            other => Err(format!("Unknown currency: '{}'. Valid options: HTG, USD", other)),
        }
    }
}

// =============================================================================
// Product Category
// =============================================================================

/// Product category. Drives which stock counter is authoritative.
///
/// Categories other than the three with stock semantics are kept verbatim
/// in [`ProductCategory::Other`] so they survive a storage round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductCategory {
    Standard,
    /// Sold by the bar (`stock_barre`).
    Iron,
    /// Sold by the box (`stock_boite`).
    Ceramic,
    Other(String),
}

impl ProductCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ProductCategory::Standard => "standard",
            ProductCategory::Iron => "iron",
            ProductCategory::Ceramic => "ceramic",
            ProductCategory::Other(name) => name,
        }
    }
}

impl From<String> for ProductCategory {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "standard" | "" => ProductCategory::Standard,
            "iron" | "fer" => ProductCategory::Iron,
            "ceramic" | "ceramique" | "céramique" => ProductCategory::Ceramic,
            _ => ProductCategory::Other(value),
        }
    }
}

impl From<ProductCategory> for String {
    fn from(value: ProductCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Exactly one of `quantity`, `stock_barre`, `stock_boite` is authoritative
/// for a given product; see [`crate::stock::StockField::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,

    /// Display name, copied into sale items at time of sale.
    pub name: String,

    #[cfg_attr(feature = "sqlx", sqlx(try_from = "String"))]
    #[ts(as = "String")]
    pub category: ProductCategory,

    /// Unit counter used by standard products.
    pub quantity: i64,

    /// Bar counter used by iron products.
    pub stock_barre: Option<i64>,

    /// Box counter used by ceramic products.
    pub stock_boite: Option<i64>,

    /// Cost basis in minor units (for profit snapshots).
    pub purchase_price_cents: i64,

    /// Stock level at or below which a stock alert is raised.
    pub alert_threshold: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// New product with a fresh id, empty stock and no cost basis.
    ///
    /// ```rust
    /// use vendo_core::types::{Product, ProductCategory};
    ///
    /// let rebar = Product::new("Fer 12mm", ProductCategory::Iron)
    ///     .with_bars(100)
    ///     .with_purchase_price(25_000)
    ///     .with_alert_threshold(10);
    /// assert_eq!(rebar.stock_barre, Some(100));
    /// ```
    pub fn new(name: impl Into<String>, category: ProductCategory) -> Self {
        let now = Utc::now();
        Product {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            category,
            quantity: 0,
            stock_barre: None,
            stock_boite: None,
            purchase_price_cents: 0,
            alert_threshold: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_bars(mut self, bars: i64) -> Self {
        self.stock_barre = Some(bars);
        self
    }

    pub fn with_boxes(mut self, boxes: i64) -> Self {
        self.stock_boite = Some(boxes);
        self
    }

    pub fn with_purchase_price(mut self, cents: i64) -> Self {
        self.purchase_price_cents = cents;
        self
    }

    pub fn with_alert_threshold(mut self, threshold: i64) -> Self {
        self.alert_threshold = threshold;
        self
    }

    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }
}

// =============================================================================
// Actor
// =============================================================================

/// Privilege level of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Elevated privilege: may reverse sales.
    Admin,
    /// Regular cashier: may create sales.
    Seller,
}

/// The authenticated user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Actor { id: id.into(), role }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Payment Method / Discount
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    MobileMoney,
    Credit,
}

/// How the discount value of a sale is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DiscountType {
    #[default]
    None,
    /// Value is a whole percentage of the subtotal (10 = 10%).
    Percentage,
    /// Value is an amount in minor units.
    Fixed,
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Never updated; removed only by a full reversal.
///
/// Amounts are in minor units of the display currency configured when the
/// sale was created. `total_cents` is tax-inclusive.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub seller_id: String,
    pub customer_name: Option<String>,
    pub payment_method: PaymentMethod,
    pub subtotal_cents: i64,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub discount_amount_cents: i64,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses the snapshot pattern: name and cost basis are frozen at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    /// Reference only; the product may later be deleted.
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
    pub currency: Currency,
    pub purchase_price_at_sale_cents: i64,
    /// `(unit_price - purchase_price_at_sale) * quantity`
    pub profit_amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_amount_cents)
    }
}

/// Profit snapshot for one line.
///
/// ```rust
/// use vendo_core::{money::Money, types::profit_amount};
///
/// let profit = profit_amount(Money::from_cents(1500), Money::from_cents(1000), 3);
/// assert_eq!(profit.cents(), 1500);
/// ```
#[inline]
pub fn profit_amount(unit_price: Money, purchase_price: Money, quantity: i64) -> Money {
    (unit_price - purchase_price).multiply_quantity(quantity)
}

// =============================================================================
// Stock Movement
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum MovementType {
    In,
    Out,
}

/// Append-only stock ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub movement_type: MovementType,
    /// Signed delta: negative for out-movements.
    pub quantity: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    /// Storage column the delta was applied to.
    pub stock_field: String,
    pub reason: String,
    /// Nulled (never deleted) when the sale is reversed.
    pub sale_id: Option<String>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Activity Log
// =============================================================================

/// Business events this engine records.
///
/// The activity table is shared with other writers, so rows keep the action
/// as free text; this enum only covers the values produced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    SaleCreated,
    SaleDeleted,
    StockAlert,
}

impl ActivityAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::SaleCreated => "sale_created",
            ActivityAction::SaleDeleted => "sale_deleted",
            ActivityAction::StockAlert => "stock_alert",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only business-event record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ActivityLog {
    pub id: String,
    pub action_type: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub description: String,
    /// Structured metadata as a JSON document.
    pub metadata: String,
    /// `None` means the event was system-originated.
    pub actor_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    /// Parses the metadata column. Malformed documents yield `Value::Null`.
    pub fn metadata_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.metadata).unwrap_or(serde_json::Value::Null)
    }
}

/// An activity entry about to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub action: ActivityAction,
    pub entity_type: &'static str,
    pub entity_id: Option<String>,
    pub description: String,
    pub metadata: serde_json::Value,
    pub actor_id: Option<String>,
}
