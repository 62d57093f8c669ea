//! # Validation Module
//!
//! Field-level input checks for the create-sale payload and identifiers.
//!
//! ## Where It Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP body (serde)          → shape and enum values                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cart::validate             → THIS MODULE, one check per field          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cart::check_totals         → totals against the normalizer             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                     → NOT NULL, CHECK, foreign keys             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every check here runs before the first write.

use crate::error::ValidationError;
use crate::types::DiscountType;
use crate::{MAX_AMOUNT_CENTS, MAX_CART_ITEMS, MAX_CUSTOMER_NAME_LEN, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product reference on a cart line.
///
/// ```rust
/// use vendo_core::validation::validate_product_id;
///
/// assert!(validate_product_id("prod-001").is_ok());
/// assert!(validate_product_id("  ").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::required("productId"));
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "productId".to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates the optional customer name and returns it trimmed.
///
/// Blank names collapse to `None` (walk-in customer).
pub fn validate_customer_name(name: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if name.chars().count() > MAX_CUSTOMER_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "customerName".to_string(),
            max: MAX_CUSTOMER_NAME_LEN,
        });
    }

    Ok(Some(name.to_string()))
}

/// Validates a free-text search term used by the activity log viewer.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Escapes `\`, `%` and `_` so a search term matches literally in a
/// `LIKE ... ESCAPE '\'` pattern.
///
/// ```rust
/// use vendo_core::validation::escape_like;
///
/// assert_eq!(escape_like("100%_off"), "100\\%\\_off");
/// ```
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount in minor units. Zero is allowed (free items), and
/// nothing above [`MAX_AMOUNT_CENTS`].
///
/// ```rust
/// use vendo_core::validation::validate_amount_cents;
///
/// assert!(validate_amount_cents("unitPrice", 1099).is_ok());
/// assert!(validate_amount_cents("unitPrice", 0).is_ok());
/// assert!(validate_amount_cents("unitPrice", -100).is_err());
/// assert!(validate_amount_cents("unitPrice", i64::MAX).is_err());
/// ```
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates a discount value against its type.
///
/// Percentages are whole percent in `0..=100`; fixed discounts are a
/// non-negative amount in minor units; `none` carries no value.
pub fn validate_discount(kind: DiscountType, value: i64) -> ValidationResult<()> {
    match kind {
        DiscountType::None if value != 0 => Err(ValidationError::OutOfRange {
            field: "discountValue".to_string(),
            min: 0,
            max: 0,
        }),
        DiscountType::Percentage if !(0..=100).contains(&value) => Err(ValidationError::OutOfRange {
            field: "discountValue".to_string(),
            min: 0,
            max: 100,
        }),
        _ => validate_amount_cents("discountValue", value),
    }
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines in a cart.
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::required("items"));
    }

    if lines > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID path parameter such as a sale id.
///
/// ```rust
/// use vendo_core::validation::validate_uuid;
///
/// assert!(validate_uuid("saleId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("saleId", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}
