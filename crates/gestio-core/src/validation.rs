//! # Validation Module
//!
//! Form-input parsing for Gestio.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extraction (axum)                                        │
//! │  ├── Content-type / shape checks (deserialization)                     │
//! │  └── Raw field strings land here                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Field-by-field parsing (trim, float, integer)                     │
//! │  └── ALL failures accumulated into ValidationErrors                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── CHECK (price >= 0), CHECK (stock >= 0)                            │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Forms arrive as optional raw strings (missing field, empty field, and
//! unparseable field are all distinct in HTML forms), so every parser here
//! takes `Option<&str>`.

use chrono::NaiveDate;

use crate::error::{ValidationError, ValidationErrors};
use crate::types::{NewProduct, SaleLine};

/// Result type for single-field validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Product Form Fields
// =============================================================================

/// Parses the `nombre` field: required, non-empty after trimming.
pub fn parse_name(raw: Option<&str>) -> ValidationResult<String> {
    let name = raw.unwrap_or_default().trim();

    if name.is_empty() {
        return Err(ValidationError::required("nombre"));
    }

    Ok(name.to_string())
}

/// Parses the `precio` field: a finite, non-negative number.
///
/// A missing field is reported the same way as garbage input: neither
/// parses as a number.
pub fn parse_price(raw: Option<&str>) -> ValidationResult<f64> {
    let field = "precio";
    let raw = raw.unwrap_or_default().trim();

    let price: f64 = raw.parse().map_err(|_| ValidationError::NotANumber {
        field: field.to_string(),
    })?;

    if !price.is_finite() {
        return Err(ValidationError::NotANumber {
            field: field.to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(price)
}

/// Parses the `stock` field: a non-negative whole number.
pub fn parse_stock(raw: Option<&str>) -> ValidationResult<i64> {
    let field = "stock";
    let raw = raw.unwrap_or_default().trim();

    let stock: i64 = raw.parse().map_err(|_| ValidationError::NotAnInteger {
        field: field.to_string(),
    })?;

    if stock < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(stock)
}

/// Validates a whole product form, accumulating every field failure.
///
/// ## Example
/// ```rust
/// use gestio_core::validation::validate_product_form;
///
/// let product = validate_product_form(Some("Azúcar 1kg"), Some("2.10"), Some("25")).unwrap();
/// assert_eq!(product.name_lower, "azúcar 1kg");
///
/// // Three bad fields → three errors, not one.
/// let errors = validate_product_form(Some("  "), Some("abc"), Some("-1")).unwrap_err();
/// assert_eq!(errors.len(), 3);
/// ```
pub fn validate_product_form(
    name: Option<&str>,
    price: Option<&str>,
    stock: Option<&str>,
) -> Result<NewProduct, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = errors.capture(parse_name(name));
    let price = errors.capture(parse_price(price));
    let stock = errors.capture(parse_stock(stock));

    match (name, price, stock) {
        (Some(name), Some(price), Some(stock)) => Ok(NewProduct::new(&name, price, stock)),
        _ => Err(errors),
    }
}

// =============================================================================
// Sale Lines
// =============================================================================

/// Validates a submitted cart before any stock is touched.
///
/// An empty cart is a validation failure, and every line must reference a
/// product and ask for a positive quantity (a non-positive quantity would
/// turn the stock decrement into an increment).
pub fn validate_sale_lines(lines: &[SaleLine]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if lines.is_empty() {
        errors.push(ValidationError::required("items"));
    }

    for line in lines {
        if line.product_id.trim().is_empty() {
            errors.push(ValidationError::required("id"));
        }
        if line.quantity < 1 {
            errors.push(ValidationError::MustBePositive {
                field: "cantidad".to_string(),
            });
        }
    }

    errors.into_result(())
}

// =============================================================================
// Queries
// =============================================================================

/// Parses the `q` search parameter: required, non-empty after trimming.
///
/// Returns the trimmed query as submitted; lowercasing for the prefix
/// scan happens at the lookup site so the exact-id probe sees the
/// original casing.
pub fn parse_search_query(raw: Option<&str>) -> ValidationResult<String> {
    let query = raw.unwrap_or_default().trim();

    if query.is_empty() {
        return Err(ValidationError::required("q"));
    }

    Ok(query.to_string())
}

/// Parses an optional `from`/`to` report filter as a `YYYY-MM-DD` date.
///
/// Absent and blank both mean "no bound"; anything else must parse.
pub fn parse_report_date(raw: Option<&str>, field: &str) -> ValidationResult<Option<NaiveDate>> {
    let raw = raw.unwrap_or_default().trim();

    if raw.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate {
            field: field.to_string(),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
