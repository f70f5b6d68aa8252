//! # Database Error Types
//!
//! The storage-layer error taxonomy and its mapping from `sqlx`.
//!
//! ## Propagation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error ──► DbError (this module) ──► ApiError (route boundary)    │
//! │                                                                         │
//! │  NotFound        targeted lookup or mutation matched nothing            │
//! │  Constraint      UNIQUE / FOREIGN KEY / CHECK rejected a write          │
//! │  everything else surfaces as a 500 with the detail kept in the log      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite reports constraint failures only through the error message
//! (`"UNIQUE constraint failed: products.id"`, `"CHECK constraint failed:
//! stock"`), so the `From<sqlx::Error>` impl sniffs the message text. The
//! schema's CHECK constraints on `stock` and `price` land here too.

use thiserror::Error;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A lookup by id, or an UPDATE/DELETE aimed at one row, matched
    /// nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A schema constraint rejected the write. Carries the SQLite message,
    /// which names the constraint.
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// The pool could not be opened, or was closed underneath us.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A pending migration did not apply cleanly.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Timed out waiting for a pooled connection.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Any other execution failure, message preserved for the log.
    #[error("Query failed: {0}")]
    Query(String),
}

impl DbError {
    /// NotFound for the given entity kind and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // Repositories fetch with `fetch_optional` and decide absence
            // themselves; this arm covers stray `fetch_one` paths.
            sqlx::Error::RowNotFound => DbError::not_found("Row", "?"),

            sqlx::Error::Database(e) if e.message().contains("constraint failed") => {
                DbError::Constraint(e.message().to_string())
            }
            sqlx::Error::Database(e) => DbError::Query(e.message().to_string()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),

            other => DbError::Query(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
