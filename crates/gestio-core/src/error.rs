//! # Error Module
//!
//! Every failure the domain layer can report, typed.
//!
//! ## Where Each Error Lives
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  this file       CoreError          missing entity, oversold line       │
//! │                  ValidationError    one failed field check              │
//! │                  ValidationErrors   every failed check for a form       │
//! │                  AuthError          login failures                      │
//! │                                                                         │
//! │  gestio-db       DbError            pool, migration, SQL failures       │
//! │  gestio-server   ApiError           status code + JSON body             │
//! │                                                                         │
//! │  ValidationError(s) ──► CoreError ──► ApiError ──► panel                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers match on variants, so context travels in fields (`name`,
//! `available`, `field`) rather than preformatted strings. A form never
//! stops at the first bad input: [`ValidationErrors`] collects every
//! failed field and reports them together.

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Failures of the panel's business rules.
///
/// Raised by the service layer and the checkout transaction; the route
/// boundary turns each variant into an HTTP response.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found (unknown id, or deleted between a read and
    /// a dependent write).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// No sale recorded under this id.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// A sale line asked for more units than the product has.
    ///
    /// The checkout pre-checks the cart against fetched products, and the
    /// conditional decrement in the repository raises it again if the row
    /// changed between read and write:
    ///
    /// ```text
    /// cantidad: 6 ──► UPDATE products SET stock = stock - 6
    ///                 WHERE id = ?1 AND stock >= 6            (0 rows)
    ///                          │
    ///                          ▼
    ///       InsufficientStock { name, available: 2, requested: 6 }
    /// ```
    ///
    /// Both paths report the stock the failure actually saw.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Validation failed (wraps the accumulated field errors).
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

impl CoreError {
    /// Whether this error is a missing-entity failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::ProductNotFound(_) | CoreError::SaleNotFound(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// One failed field check.
///
/// The `field` names match the wire names the panel submits
/// (`nombre`, `precio`, `stock`, `items`, `cantidad`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty after trimming.
    #[error("{field} is required")]
    Required { field: String },

    /// Field could not be parsed as a number.
    #[error("{field} must be a valid number")]
    NotANumber { field: String },

    /// Field could not be parsed as a whole number.
    #[error("{field} must be a whole number")]
    NotAnInteger { field: String },

    /// Numeric field is negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Numeric field must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Field is not a calendar date in `YYYY-MM-DD` form.
    #[error("{field} must be a date in YYYY-MM-DD format")]
    InvalidDate { field: String },
}

impl ValidationError {
    /// Shorthand used by the field validators.
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Accumulated Validation Errors
// =============================================================================

/// Every failed check for one submitted form.
///
/// Forms are validated field by field and ALL failures are collected
/// before reporting, so the panel can mark every offending input at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Records the error half of a field check, passing values through.
    pub fn capture<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// User-facing message per failed field, in check order.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|e| e.to_string()).collect()
    }

    /// Consumes the accumulator: `Ok(value)` when clean, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors(vec![error])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Auth Error
// =============================================================================

/// Login failures.
///
/// `UnknownAccount` and `InvalidCredentials` are kept distinct internally
/// (for logging) but the HTTP layer reports both with the same generic
/// message so responses don't reveal which emails exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential record for the submitted email.
    #[error("unknown account")]
    UnknownAccount,

    /// The account exists but is deactivated.
    #[error("account is inactive")]
    AccountInactive,

    /// The password hash did not match.
    #[error("invalid credentials")]
    InvalidCredentials,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Result alias used across the domain layer.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
