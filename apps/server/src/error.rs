//! # HTTP Error Surface
//!
//! One error type for every handler, with `From` impls for each layer
//! underneath.
//!
//! ## How Failures Reach the Client
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  POST /api/ventas ──► handler returns Result<T, ApiError>               │
//! │                                                                         │
//! │     ValidationErrors ──────────────┐                                    │
//! │     CoreError ─────────────────────┼──► ApiError ──► status + JSON      │
//! │     DbError / SessionError ────────┘                                    │
//! │                                                                         │
//! │  ◄── 400 {"errors": ["precio must be a valid number", ...]}            │
//! │  ◄── 404 {"error": "Product not found: abc"}                           │
//! │  ◄── 500 {"error": "internal error"}        (detail only in the log)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation failures carry EVERY accumulated field message; all other
//! failures carry a single `error` string. Backend faults never leak
//! detail to the client: the full error is logged and the body says
//! `internal error`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use gestio_core::{AuthError, CoreError, ValidationError, ValidationErrors};
use gestio_db::{DbError, RegisterSaleError};

use crate::session::SessionError;

/// Result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error returned from HTTP handlers.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error class; decides the HTTP status and the body shape
    pub code: ErrorCode,

    /// Human-readable message for the client
    pub message: String,

    /// Accumulated field messages; populated only for `ValidationError`
    pub errors: Vec<String>,
}

/// Error classes and their HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Unknown product or sale id (404)
    NotFound,

    /// One or more form fields failed their checks (400)
    ValidationError,

    /// Sale rejected: not enough stock (400)
    InsufficientStock,

    /// Sale rejected: the cart references something that doesn't exist (400)
    CartError,

    /// Login failed (401)
    Unauthorized,

    /// Account exists but may not log in (403)
    Forbidden,

    /// Storage failure, detail withheld from the body (500)
    DatabaseError,

    /// Any other backend fault (500)
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::CartError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// An error with a single message and no field list.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// 404 naming the missing entity.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error carrying every accumulated message.
    pub fn validation(errors: Vec<String>) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: errors.join("; "),
            errors,
        }
    }

    /// Creates an internal error with the client-safe generic message.
    pub fn internal() -> Self {
        ApiError::new(ErrorCode::Internal, "internal error")
    }

    /// Reclassifies a missing product as a cart problem.
    ///
    /// Sale registration reports an unknown product id as a 400 (the cart
    /// is wrong), not a 404 (the route resolved fine).
    pub fn into_sale_rejection(self) -> Self {
        match self.code {
            ErrorCode::NotFound => ApiError::new(ErrorCode::CartError, self.message),
            _ => self,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        let body = if self.code == ErrorCode::ValidationError {
            json!({ "errors": self.errors })
        } else {
            json!({ "error": self.message })
        };

        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::validation(errors.messages())
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::from(ValidationErrors::from(error))
    }
}

/// Domain rejections keep their message; each variant picks its status.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", &id),
            CoreError::InsufficientStock {
                name,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: available {}, requested {}",
                    name, available, requested
                ),
            ),
            CoreError::Validation(errors) => errors.into(),
        }
    }
}

/// `NotFound` is the only storage error a caller can act on. Everything
/// else (constraint, pool, migration, query failures) is a server-side
/// fault: the detail goes to the log, the body stays generic.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            other => {
                tracing::error!(error = %other, "Database failure");
                ApiError::new(ErrorCode::DatabaseError, "internal error")
            }
        }
    }
}

/// Converts sale registration errors to API errors.
impl From<RegisterSaleError> for ApiError {
    fn from(err: RegisterSaleError) -> Self {
        match err {
            RegisterSaleError::Core(e) => e.into(),
            RegisterSaleError::Db(e) => e.into(),
        }
    }
}

/// Converts login failures to API errors.
///
/// Unknown account and bad password share one generic body so responses
/// don't reveal which emails exist; an inactive account is a 403.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UnknownAccount | AuthError::InvalidCredentials => {
                ApiError::new(ErrorCode::Unauthorized, "invalid credentials")
            }
            AuthError::AccountInactive => {
                ApiError::new(ErrorCode::Forbidden, "account is inactive")
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        tracing::error!("Session token error: {}", err);
        ApiError::internal()
    }
}

/// Converts JSON body rejections to validation errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(vec![rejection.body_text()])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
