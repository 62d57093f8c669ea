//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! Pricing values are checked here so the ledger never sees a zero exchange
//! rate or an out-of-range tax rate.

use rust_decimal::Decimal;
use serde::Serialize;
use std::env;
use std::str::FromStr;
use vendo_core::{Currency, ExchangeRate, TaxRate};
use vendo_ledger::LedgerConfig;

/// API server configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Secret for signing and checking bearer tokens
    #[serde(skip)]
    pub jwt_secret: String,

    /// Lifetime of issued tokens in seconds
    pub jwt_lifetime_secs: i64,

    /// HTG per USD
    pub exchange_rate: Decimal,

    /// Currency revenue figures are shown in
    pub display_currency: Currency,

    /// Flat tax percentage (10 = 10%)
    pub tax_rate_percent: Decimal,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = ApiConfig {
            http_port: var("VENDO_HTTP_PORT", "8080")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VENDO_HTTP_PORT".to_string()))?,

            database_path: var("VENDO_DATABASE_PATH", "./vendo.db"),

            jwt_secret: var("VENDO_JWT_SECRET", "vendo-dev-secret-change-in-production"),

            jwt_lifetime_secs: var("VENDO_JWT_LIFETIME_SECS", "43200") // 12 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VENDO_JWT_LIFETIME_SECS".to_string()))?,

            exchange_rate: Decimal::from_str(&var("VENDO_EXCHANGE_RATE", "132"))
                .map_err(|_| ConfigError::InvalidValue("VENDO_EXCHANGE_RATE".to_string()))?,

            display_currency: var("VENDO_DISPLAY_CURRENCY", "HTG")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VENDO_DISPLAY_CURRENCY".to_string()))?,

            tax_rate_percent: Decimal::from_str(&var("VENDO_TAX_RATE_PERCENT", "0"))
                .map_err(|_| ConfigError::InvalidValue("VENDO_TAX_RATE_PERCENT".to_string()))?,
        };

        if config.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("VENDO_JWT_SECRET".to_string()));
        }

        // Fails early on a bad rate or tax percentage.
        config.ledger_config()?;

        Ok(config)
    }

    /// Pricing settings for the ledger coordinators.
    pub fn ledger_config(&self) -> Result<LedgerConfig, ConfigError> {
        let rate = ExchangeRate::new(self.exchange_rate)
            .map_err(|_| ConfigError::InvalidValue("VENDO_EXCHANGE_RATE".to_string()))?;
        let tax = TaxRate::from_percent(self.tax_rate_percent)
            .map_err(|_| ConfigError::InvalidValue("VENDO_TAX_RATE_PERCENT".to_string()))?;

        Ok(LedgerConfig::new(rate, self.display_currency, tax))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.exchange_rate, dec!(132));
        assert_eq!(config.display_currency, Currency::Htg);
        assert_eq!(config.tax_rate_percent, Decimal::ZERO);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("VENDO_EXCHANGE_RATE", "131.75"),
            ("VENDO_DISPLAY_CURRENCY", "usd"),
            ("VENDO_TAX_RATE_PERCENT", "10"),
        ])
        .unwrap();

        let ledger = config.ledger_config().unwrap();
        assert_eq!(ledger.exchange_rate.value(), dec!(131.75));
        assert_eq!(ledger.display_currency, Currency::Usd);
        assert_eq!(ledger.tax_rate.percent(), dec!(10));
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        for rate in ["0", "-5", "abc"] {
            let err = load(&[("VENDO_EXCHANGE_RATE", rate)]).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "VENDO_EXCHANGE_RATE"));
        }
    }

    #[test]
    fn test_rejects_bad_tax_and_currency() {
        assert!(load(&[("VENDO_TAX_RATE_PERCENT", "150")]).is_err());
        assert!(load(&[("VENDO_DISPLAY_CURRENCY", "EUR")]).is_err());
        assert!(load(&[("VENDO_JWT_SECRET", "  ")]).is_err());
    }
}
