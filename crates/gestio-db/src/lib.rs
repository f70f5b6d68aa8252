//! # gestio-db: SQLite Storage for Gestio
//!
//! Everything that touches the database lives here: the pooled
//! [`Database`] handle, the embedded schema migrations, and the two
//! repositories the panel is built on.
//!
//! ## Layout
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  gestio-server ──► Database (pool.rs)                                │
//! │                      ├── products() ──► ProductRepository            │
//! │                      │                  catalog CRUD, prefix find,   │
//! │                      │                  low-stock listing            │
//! │                      └── sales() ─────► SaleRepository               │
//! │                                         transactional register,      │
//! │                                         ledger queries, CSV ranges   │
//! │                                                                      │
//! │  migrations.rs   embedded 001_initial_schema.sql                     │
//! │  error.rs        DbError + sqlx mapping                              │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows deserialize straight into the `gestio-core` types through their
//! `sqlx`-gated derives; this crate defines no row structs of its own.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gestio_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./gestio.db")).await?;
//! let catalog = db.products().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::sale::{RegisterSaleError, SaleRepository};
