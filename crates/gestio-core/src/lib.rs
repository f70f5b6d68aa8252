//! # gestio-core: Domain Rules for Gestio
//!
//! Gestio is a small inventory and point-of-sale panel. This crate holds
//! its rules as plain functions over plain types: nothing here is async,
//! touches a file, or opens a socket.
//!
//! ## Position in the Workspace
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  gestio-server    axum routes, sessions, service layer                  │
//! │      │                                                                  │
//! │      │ parses forms, aggregates reports through...                      │
//! │      ▼                                                                  │
//! │  gestio-core      types · validation · report · error      (this crate) │
//! │      ▲                                                                  │
//! │      │ ...maps rows onto its types (feature "sqlx")                     │
//! │      │                                                                  │
//! │  gestio-db        pool, migrations, repositories                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both neighbors depend on this crate; it depends on neither. That keeps
//! every rule runnable under a plain `#[test]`, which is where most of the
//! workspace's test suite lives.
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Credential, etc.)
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Form input parsing with accumulated field errors
//! - [`report`] - Dashboard aggregation, sales CSV rendering, date bounds
//!
//! ## Example
//!
//! ```rust
//! use gestio_core::types::NewProduct;
//!
//! // Name is trimmed and its lowercase twin derived on construction,
//! // so the name_lower invariant can never drift.
//! let product = NewProduct::new("  Yerba Mate 1kg ", 8.50, 12);
//!
//! assert_eq!(product.name, "Yerba Mate 1kg");
//! assert_eq!(product.name_lower, "yerba mate 1kg");
//! ```

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================
// The flat paths (`gestio_core::Product`) are the ones the other crates use.

pub use error::{AuthError, CoreError, ValidationError, ValidationErrors};
pub use types::*;

// =============================================================================
// Constants
// =============================================================================

/// Default low-stock threshold when `STOCK_THRESHOLD` is not configured.
///
/// Products with `stock` strictly below this value are flagged on the
/// dashboard and the alerts view.
pub const DEFAULT_STOCK_THRESHOLD: i64 = 5;

/// Number of products shown in the dashboard's low-stock shortlist.
pub const TOP_LOW_STOCK_LIMIT: usize = 5;

/// Upper-bound sentinel for prefix searches over `name_lower`.
///
/// A prefix query `q` matches the half-open range `[q, q + SENTINEL)`:
/// every name that starts with `q` sorts inside it, everything else
/// sorts outside. U+F8FF is a private-use codepoint that no real
/// product name contains.
pub const NAME_PREFIX_SENTINEL: char = '\u{f8ff}';
