//! # Currency & Tax Normalizer
//!
//! The single place where multi-currency line items become one figure.
//! Sale validation, per-sale display and revenue reports all call [`unify`]
//! and [`apply_tax`]; nothing else in the workspace converts currencies.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  local     = Σ subtotal of HTG items                                    │
//! │  secondary = Σ subtotal of USD items                                    │
//! │                                                                         │
//! │  display = HTG  →  unified = local + secondary × rate                   │
//! │  display = USD  →  unified = secondary + local ÷ rate                   │
//! │                                                                         │
//! │  tax-inclusive = unified × (1 + tax% ÷ 100)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `rate` is "HTG per USD". All arithmetic is `Decimal`; rounding back to
//! minor units happens only through [`Money::from_decimal`].
//!
//! ## Example
//! ```rust
//! use rust_decimal::Decimal;
//! use vendo_core::currency::{unify, ExchangeRate};
//! use vendo_core::{Currency, Money};
//!
//! let items = [
//!     (Currency::Htg, Money::from_cents(100_000)), // 1000 HTG
//!     (Currency::Usd, Money::from_cents(1_000)),   // 10 USD
//! ];
//! let rate = ExchangeRate::new(Decimal::from(132)).unwrap();
//! let totals = unify(&items, rate, Currency::Htg);
//! assert_eq!(totals.unified_total, Decimal::from(2320));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Currency, SaleItem};

// =============================================================================
// Exchange Rate
// =============================================================================

/// Units of local currency per unit of secondary currency.
///
/// Can only be built through [`ExchangeRate::new`], which rejects zero and
/// negative rates, so the normalizer never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    pub fn new(rate: Decimal) -> CoreResult<Self> {
        if rate <= Decimal::ZERO {
            return Err(CoreError::InvalidExchangeRate(rate.to_string()));
        }
        Ok(ExchangeRate(rate))
    }

    #[inline]
    pub fn value(&self) -> Decimal {
        self.0
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Flat tax rate as a percentage (10 = 10%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TaxRate(Decimal);

impl TaxRate {
    pub fn from_percent(percent: Decimal) -> CoreResult<Self> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(CoreError::InvalidTaxRate(percent.to_string()));
        }
        Ok(TaxRate(percent))
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    #[inline]
    pub fn percent(&self) -> Decimal {
        self.0
    }
}

// =============================================================================
// Unified Totals
// =============================================================================

/// Anything priced in one of the two currencies.
pub trait CurrencyAmount {
    fn currency(&self) -> Currency;
    fn amount(&self) -> Money;
}

impl CurrencyAmount for SaleItem {
    fn currency(&self) -> Currency {
        self.currency
    }

    fn amount(&self) -> Money {
        self.subtotal()
    }
}

impl CurrencyAmount for (Currency, Money) {
    fn currency(&self) -> Currency {
        self.0
    }

    fn amount(&self) -> Money {
        self.1
    }
}

/// Result of [`unify`]. All figures are in major units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedTotals {
    pub local_total: Decimal,
    pub secondary_total: Decimal,
    pub unified_total: Decimal,
    pub display: Currency,
}

impl UnifiedTotals {
    /// Expresses the unified total in `target`, converting through `rate`.
    pub fn expressed_in(&self, target: Currency, rate: ExchangeRate) -> Decimal {
        match (self.display, target) {
            (Currency::Htg, Currency::Usd) => self.unified_total / rate.value(),
            (Currency::Usd, Currency::Htg) => self.unified_total * rate.value(),
            _ => self.unified_total,
        }
    }
}

/// Sums items per currency and converts the result into `display`.
pub fn unify<'a, I, T>(items: I, rate: ExchangeRate, display: Currency) -> UnifiedTotals
where
    I: IntoIterator<Item = &'a T>,
    T: CurrencyAmount + 'a,
{
    // Accumulated in Decimal: a report window may exceed i64 cents.
    let (local_total, secondary_total) = items.into_iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(local, secondary), item| {
            let amount = item.amount().to_decimal();
            if item.currency().is_local() {
                (local + amount, secondary)
            } else {
                (local, secondary + amount)
            }
        },
    );

    let unified_total = match display {
        Currency::Htg => local_total + secondary_total * rate.value(),
        Currency::Usd => secondary_total + local_total / rate.value(),
    };

    UnifiedTotals {
        local_total,
        secondary_total,
        unified_total,
        display,
    }
}

/// Rounds a major-unit figure to minor units (banker's rounding).
#[inline]
pub fn to_cents(amount: Decimal) -> i64 {
    Money::from_decimal(amount).cents()
}

/// `unified × (1 + tax% / 100)`
pub fn apply_tax(unified: Decimal, tax: TaxRate) -> Decimal {
    unified * (Decimal::ONE + tax.percent() / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn rate(value: Decimal) -> ExchangeRate {
        ExchangeRate::new(value).unwrap()
    }

    #[test]
    fn test_unify_local_display() {
        let items = [
            (Currency::Htg, Money::from_cents(100_000)),
            (Currency::Usd, Money::from_cents(1_000)),
        ];
        let totals = unify(&items, rate(dec!(132)), Currency::Htg);
        assert_eq!(totals.local_total, dec!(1000));
        assert_eq!(totals.secondary_total, dec!(10));
        assert_eq!(totals.unified_total, dec!(2320));
        assert_eq!(to_cents(totals.unified_total), 232_000);
    }

    #[test]
    fn test_unify_secondary_display() {
        let items = [
            (Currency::Htg, Money::from_cents(132_000)),
            (Currency::Usd, Money::from_cents(500)),
        ];
        let totals = unify(&items, rate(dec!(132)), Currency::Usd);
        assert_eq!(totals.unified_total, dec!(15));
        assert_eq!(totals.display, Currency::Usd);
    }

    #[test]
    fn test_unify_empty_is_zero() {
        let items: [(Currency, Money); 0] = [];
        let totals = unify(&items, rate(dec!(132)), Currency::Htg);
        assert_eq!(totals.unified_total, Decimal::ZERO);
    }

    #[test]
    fn test_apply_tax() {
        let tax = TaxRate::from_percent(dec!(10)).unwrap();
        assert_eq!(apply_tax(dec!(2320), tax), dec!(2552));
        assert_eq!(apply_tax(dec!(2320), TaxRate::zero()), dec!(2320));
    }

    #[test]
    fn test_to_cents_rounds_half_even() {
        assert_eq!(to_cents(dec!(2552)), 255_200);
        assert_eq!(to_cents(dec!(10.005)), 1_000);
        assert_eq!(to_cents(dec!(10.015)), 1_002);
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        assert!(matches!(
            ExchangeRate::new(Decimal::ZERO),
            Err(CoreError::InvalidExchangeRate(_))
        ));
        assert!(ExchangeRate::new(dec!(-1)).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_tax() {
        assert!(TaxRate::from_percent(dec!(-0.5)).is_err());
        assert!(TaxRate::from_percent(dec!(100.01)).is_err());
        assert!(TaxRate::from_percent(dec!(100)).is_ok());
    }

    #[test]
    fn test_expressed_in() {
        let items = [(Currency::Usd, Money::from_cents(1_000))];
        let totals = unify(&items, rate(dec!(132)), Currency::Usd);
        assert_eq!(totals.expressed_in(Currency::Htg, rate(dec!(132))), dec!(1320));
        assert_eq!(totals.expressed_in(Currency::Usd, rate(dec!(132))), dec!(10));
    }

    fn amount() -> impl Strategy<Value = i64> {
        0i64..10_000_000_00
    }

    fn positive_rate() -> impl Strategy<Value = Decimal> {
        (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Totals agree once expressed in a common currency, whichever
        /// display currency was picked.
        #[test]
        fn prop_unify_is_currency_linear(
            local in amount(),
            secondary in amount(),
            r in positive_rate(),
        ) {
            let items = [
                (Currency::Htg, Money::from_cents(local)),
                (Currency::Usd, Money::from_cents(secondary)),
            ];
            let rate = ExchangeRate::new(r).unwrap();
            let in_local = unify(&items, rate, Currency::Htg);
            let in_secondary = unify(&items, rate, Currency::Usd);

            let diff = (in_local.unified_total - in_secondary.expressed_in(Currency::Htg, rate)).abs();
            prop_assert!(diff <= dec!(0.000001), "diff = {}", diff);
        }

        #[test]
        fn prop_tax_never_lowers_total(
            cents in amount(),
            pct in 0u32..=100,
        ) {
            let unified = Money::from_cents(cents).to_decimal();
            let tax = TaxRate::from_percent(Decimal::from(pct)).unwrap();
            prop_assert!(apply_tax(unified, tax) >= unified);
        }
    }
}
