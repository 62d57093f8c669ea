//! # Ledger Errors
//!
//! Failures surfaced by sale creation, sale reversal and revenue reporting.
//!
//! ## Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Variant            Code                When                 Retry?     │
//! │  ─────────────────  ──────────────────  ───────────────────  ──────     │
//! │  Validation         VALIDATION_ERROR    before any write     no         │
//! │  InsufficientStock  INSUFFICIENT_STOCK  availability check   no         │
//! │  StockChanged       STOCK_CHANGED       conditional update   yes        │
//! │  ProductNotFound    NOT_FOUND           availability check   no         │
//! │  SaleNotFound       NOT_FOUND           reversal / display   no         │
//! │  PermissionDenied   PERMISSION_DENIED   reversal only        no         │
//! │  ReversalFailed     REVERSAL_FAILED     delete steps 3-5     no         │
//! │  Database           DATABASE_ERROR      anything else        pool only  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed restore of a single product during reversal is not an error:
//! it is logged and reported in the reversal summary.

use thiserror::Error;
use vendo_core::{CoreError, ValidationError};
use vendo_db::DbError;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed input. Nothing was written.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A line asks for more than the authoritative counter holds.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// Stock moved between the availability check and the conditional
    /// decrement. The whole sale was rolled back; resubmitting is safe.
    #[error("Stock for product {product_id} changed while the sale was being recorded")]
    StockChanged { product_id: String },

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Removing items, detaching movements or removing the sale failed.
    /// The reversal was rolled back as a whole.
    #[error("Sale reversal failed: {0}")]
    ReversalFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl LedgerError {
    /// Machine-readable code carried in the API envelope.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "VALIDATION_ERROR",
            LedgerError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            LedgerError::StockChanged { .. } => "STOCK_CHANGED",
            LedgerError::ProductNotFound(_) | LedgerError::SaleNotFound(_) => "NOT_FOUND",
            LedgerError::PermissionDenied(_) => "PERMISSION_DENIED",
            LedgerError::ReversalFailed(_) => "REVERSAL_FAILED",
            LedgerError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// True when resubmitting the identical request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LedgerError::StockChanged { .. } => true,
            LedgerError::Database(e) => e.is_transient(),
            _ => false,
        }
    }

    pub(crate) fn reversal_failed(step: &str, err: impl std::fmt::Display) -> Self {
        LedgerError::ReversalFailed(format!("{step}: {err}"))
    }
}

impl From<CoreError> for LedgerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock {
                product_id,
                requested,
                available,
            } => LedgerError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            CoreError::Validation(e) => LedgerError::Validation(e),
            other @ (CoreError::InvalidExchangeRate(_) | CoreError::InvalidTaxRate(_)) => {
                LedgerError::Validation(ValidationError::InvalidFormat {
                    field: "pricing".to_string(),
                    reason: other.to_string(),
                })
            }
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_retryability() {
        let changed = LedgerError::StockChanged {
            product_id: "p".into(),
        };
        assert_eq!(changed.code(), "STOCK_CHANGED");
        assert!(changed.is_retryable());

        let short = LedgerError::InsufficientStock {
            product_id: "p".into(),
            requested: 12,
            available: 10,
        };
        assert_eq!(short.code(), "INSUFFICIENT_STOCK");
        assert!(!short.is_retryable());

        assert_eq!(LedgerError::SaleNotFound("s".into()).code(), "NOT_FOUND");
        assert!(LedgerError::Database(DbError::PoolExhausted).is_retryable());
        assert!(LedgerError::Database(DbError::Busy).is_retryable());
        assert!(!LedgerError::ReversalFailed("x".into()).is_retryable());
    }

    #[test]
    fn test_core_insufficient_stock_keeps_details() {
        let err: LedgerError = CoreError::InsufficientStock {
            product_id: "p-1".into(),
            requested: 12,
            available: 10,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product p-1: requested 12, available 10"
        );
    }
}
