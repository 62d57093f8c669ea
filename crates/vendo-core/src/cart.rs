//! # Cart
//!
//! The create-sale payload: what the register submits when a sale is rung up.
//!
//! Line prices are frozen by the client at the moment the line was added;
//! this module only checks that the payload is well-formed and that its
//! totals agree with the currency normalizer before anything is written.
//!
//! ## Payload Shape
//! ```text
//! {
//!   "customerName": "Jean",
//!   "paymentMethod": "cash",
//!   "discount": { "type": "percentage", "value": 10, "amountCents": 23200 },
//!   "subtotalCents": 232000,          ← unified, display currency
//!   "totalCents": 229680,             ← after discount, tax-inclusive
//!   "items": [
//!     { "productId": "…", "productName": "Ciment", "quantity": 2,
//!       "unitPriceCents": 50000, "subtotalCents": 100000, "currency": "HTG" },
//!     …
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::currency::{apply_tax, to_cents, unify, CurrencyAmount, ExchangeRate, TaxRate};
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Currency, DiscountType, PaymentMethod};
use crate::MAX_AMOUNT_CENTS;
use crate::validation::{
    validate_amount_cents, validate_cart_size, validate_customer_name, validate_discount,
    validate_product_id, validate_quantity, ValidationResult,
};

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the submitted cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,

    /// Name shown at the register. Blank means "use the product's name".
    #[serde(default)]
    pub product_name: String,

    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
    pub currency: Currency,
}

impl CartLine {
    fn validate(&self) -> ValidationResult<()> {
        validate_product_id(&self.product_id)?;
        validate_quantity(self.quantity)?;
        validate_amount_cents("unitPriceCents", self.unit_price_cents)?;
        validate_amount_cents("subtotalCents", self.subtotal_cents)?;

        let expected = self
            .unit_price_cents
            .checked_mul(self.quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: format!("items[{}].subtotalCents", self.product_id),
                min: 0,
                max: MAX_AMOUNT_CENTS,
            })?;
        if self.subtotal_cents != expected {
            return Err(ValidationError::TotalMismatch {
                field: format!("items[{}].subtotalCents", self.product_id),
                expected,
                actual: self.subtotal_cents,
            });
        }

        Ok(())
    }
}

impl CurrencyAmount for CartLine {
    fn currency(&self) -> Currency {
        self.currency
    }

    fn amount(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Discount applied to the whole sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    #[serde(rename = "type", default)]
    pub kind: DiscountType,

    /// Whole percent for `percentage`, minor units for `fixed`.
    #[serde(default)]
    pub value: i64,

    /// Resolved discount in minor units of the display currency.
    #[serde(default)]
    pub amount_cents: i64,
}

impl Discount {
    /// Discount amount implied by `kind` and `value` on a given subtotal.
    pub fn expected_amount(&self, subtotal: Money) -> Money {
        match self.kind {
            DiscountType::None => Money::zero(),
            DiscountType::Fixed => Money::from_cents(self.value),
            DiscountType::Percentage => {
                let ratio = rust_decimal::Decimal::new(self.value, 2);
                Money::from_decimal(subtotal.to_decimal() * ratio)
            }
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A complete create-sale request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub customer_name: Option<String>,

    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub discount: Discount,

    /// Unified subtotal in the display currency, before discount and tax.
    pub subtotal_cents: i64,

    /// Amount due: discounted and tax-inclusive.
    pub total_cents: i64,

    pub items: Vec<CartLine>,
}

impl Cart {
    /// Field-level validation. Runs before any storage access.
    ///
    /// Normalizes the customer name in place (trimmed, blank → `None`).
    pub fn validate(&mut self) -> ValidationResult<()> {
        validate_cart_size(self.items.len())?;
        self.customer_name = validate_customer_name(self.customer_name.as_deref())?;
        validate_discount(self.discount.kind, self.discount.value)?;
        validate_amount_cents("discount.amountCents", self.discount.amount_cents)?;
        validate_amount_cents("subtotalCents", self.subtotal_cents)?;
        validate_amount_cents("totalCents", self.total_cents)?;

        for line in &self.items {
            line.validate()?;
        }

        Ok(())
    }

    /// Maximum drift, in minor units, tolerated between submitted totals and
    /// totals recomputed by the normalizer.
    #[inline]
    pub fn rounding_tolerance(&self) -> i64 {
        self.items.len() as i64 + 1
    }

    /// Checks the submitted totals against the normalizer.
    ///
    /// ```text
    /// subtotal ≈ unify(items).unified_total
    /// discount ≈ expected_amount(subtotal)
    /// total    ≈ apply_tax(subtotal − discount)
    /// ```
    pub fn check_totals(
        &self,
        rate: ExchangeRate,
        display: Currency,
        tax: TaxRate,
    ) -> ValidationResult<()> {
        let tolerance = self.rounding_tolerance();
        let subtotal = Money::from_cents(self.subtotal_cents);

        let unified = unify(&self.items, rate, display);
        let expected_subtotal = to_cents(unified.unified_total);
        if subtotal.distance(Money::from_cents(expected_subtotal)) > tolerance {
            return Err(ValidationError::TotalMismatch {
                field: "subtotalCents".to_string(),
                expected: expected_subtotal,
                actual: self.subtotal_cents,
            });
        }

        let discount = Money::from_cents(self.discount.amount_cents);
        if discount > subtotal {
            return Err(ValidationError::OutOfRange {
                field: "discount.amountCents".to_string(),
                min: 0,
                max: self.subtotal_cents,
            });
        }
        let expected_discount = self.discount.expected_amount(subtotal);
        if discount.distance(expected_discount) > 1 {
            return Err(ValidationError::TotalMismatch {
                field: "discount.amountCents".to_string(),
                expected: expected_discount.cents(),
                actual: discount.cents(),
            });
        }

        let expected_total = to_cents(apply_tax((subtotal - discount).to_decimal(), tax));
        if Money::from_cents(self.total_cents).distance(Money::from_cents(expected_total)) > tolerance {
            return Err(ValidationError::TotalMismatch {
                field: "totalCents".to_string(),
                expected: expected_total,
                actual: self.total_cents,
            });
        }

        Ok(())
    }

    /// Requested quantity per product, in order of first appearance.
    ///
    /// Two lines for the same product must be checked against stock together.
    pub fn requested_by_product(&self) -> Vec<(&str, i64)> {
        let mut requested: Vec<(&str, i64)> = Vec::new();
        for line in &self.items {
            match requested.iter_mut().find(|(id, _)| *id == line.product_id) {
                Some((_, qty)) => *qty += line.quantity,
                None => requested.push((line.product_id.as_str(), line.quantity)),
            }
        }
        requested
    }
}
