//! # Error Types
//!
//! Domain-specific error types for vendo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vendo-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vendo-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  vendo-ledger errors                                                   │
//! │  └── LedgerError      - Create / reversal failures                     │
//! │                                                                         │
//! │  API errors (in app)                                                   │
//! │  └── ApiError         - { success: false, error } envelope             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → ApiError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Requested quantity exceeds the authoritative stock counter.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart line (qty: 12)
    ///      │
    ///      ▼
    /// Resolve stock field → quantity = 10
    ///      │
    ///      ▼
    /// InsufficientStock { product_id, requested: 12, available: 10 }
    ///      │
    ///      ▼
    /// Sale rejected, nothing written
    /// ```
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// Exchange rate is zero or negative.
    #[error("Exchange rate must be greater than zero, got {0}")]
    InvalidExchangeRate(String),

    /// Tax rate is outside 0..=100 percent.
    #[error("Tax rate must be between 0 and 100 percent, got {0}")]
    InvalidTaxRate(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any write happens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Caller-supplied totals disagree with the line items.
    #[error("{field} does not match line items: expected {expected}, got {actual}")]
    TotalMismatch {
        field: String,
        expected: i64,
        actual: i64,
    },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
