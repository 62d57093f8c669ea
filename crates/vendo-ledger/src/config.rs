//! Pricing settings shared by the processor and the reporter.

use vendo_core::{Currency, ExchangeRate, TaxRate};

/// Exchange rate, display currency and tax rate in force.
///
/// Built by the application from its configuration; the rate is already
/// validated as positive by [`ExchangeRate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    pub exchange_rate: ExchangeRate,
    pub display_currency: Currency,
    pub tax_rate: TaxRate,
}

impl LedgerConfig {
    pub fn new(exchange_rate: ExchangeRate, display_currency: Currency, tax_rate: TaxRate) -> Self {
        LedgerConfig {
            exchange_rate,
            display_currency,
            tax_rate,
        }
    }
}
