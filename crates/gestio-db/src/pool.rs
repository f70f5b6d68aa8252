//! # Database Pool
//!
//! SQLite pool construction and the shared [`Database`] handle.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ServerConfig.database_path                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path)          defaults sized for a single-host panel    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await                                            │
//! │       ├── pragmas: WAL, synchronous=NORMAL, foreign_keys, busy timeout  │
//! │       ├── SqlitePoolOptions::connect_with                               │
//! │       └── pending migrations (unless disabled)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.products() / db.sales()   cheap repository views, one per call      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Every HTTP handler clones the `Database` handle and borrows a pooled
//! connection for the duration of one query or transaction. WAL keeps the
//! read-heavy panel views (dashboard, POS screen, ledger) from blocking the
//! sale transaction, and the busy timeout turns write contention into a
//! bounded wait instead of an immediate `SQLITE_BUSY` failure.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Pool configuration.
///
/// [`DbConfig::new`] picks defaults for a panel serving a handful of
/// concurrent users; the builder methods override individual knobs.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file path. The magic name `:memory:` opens a private
    /// in-memory database instead.
    pub path: PathBuf,

    /// Upper bound on pooled connections. Default: 5.
    pub max_connections: u32,

    /// How long a handler may wait for a free connection. Default: 30s.
    pub acquire_timeout: Duration,

    /// How long a statement waits on a locked database before failing.
    /// Default: 5s.
    pub busy_timeout: Duration,

    /// Apply pending migrations inside [`Database::new`]. Default: true.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Configuration for the catalog database at `path`.
    ///
    /// The file is created on first connect if it does not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: path.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Isolated in-memory database for tests.
    ///
    /// SQLite gives every connection its own private `:memory:` database,
    /// so the pool is pinned to a single connection; a second connection
    /// would see an empty schema.
    pub fn in_memory() -> Self {
        DbConfig {
            path: PathBuf::from(":memory:"),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(1),
            run_migrations: true,
        }
    }

    /// Overrides the pooled-connection cap.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Overrides the connection acquire timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Overrides the busy timeout applied to each connection.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Enables or disables migrations during [`Database::new`].
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.path == Path::new(":memory:")
    }
}

// =============================================================================
// Database Handle
// =============================================================================

/// Shared handle over the SQLite pool.
///
/// One `Database` is built at startup and cloned into every handler; clones
/// share the same pool. Repositories are constructed per call and hold a
/// pool clone themselves, so they can outlive the borrow they came from.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool, applies the connection pragmas, and brings the
    /// schema up to date.
    ///
    /// ## Errors
    /// [`DbError::ConnectionFailed`] when the file cannot be opened,
    /// [`DbError::MigrationFailed`] when a pending migration does not apply.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.path.display(), "Opening database");

        let options = if config.is_in_memory() {
            SqliteConnectOptions::new().in_memory(true)
        } else {
            SqliteConnectOptions::new()
                .filename(&config.path)
                .create_if_missing(true)
        }
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations.
    ///
    /// Idempotent. [`Database::new`] calls this unless the config disabled
    /// it; call it manually when migrations were deferred.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Applying database migrations");
        migrations::run_migrations(&self.pool).await?;
        Ok(())
    }

    /// Raw pool access for queries the repositories do not cover.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Catalog repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Sales ledger repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Drains the pool. Pending operations fail once this returns.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    /// True when the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_healthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
    }

    #[test]
    fn test_config_defaults_and_overrides() {
        let config = DbConfig::new("./gestio-test.db");
        assert_eq!(config.max_connections, 5);
        assert!(config.run_migrations);
        assert!(!config.is_in_memory());

        let config = DbConfig::in_memory()
            .max_connections(2)
            .busy_timeout(Duration::from_millis(250))
            .run_migrations(false);
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(!config.run_migrations);
    }

    #[tokio::test]
    async fn test_deferred_migrations() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        // Schema is absent until migrations run
        assert!(sqlx::query("SELECT COUNT(*) FROM products")
            .fetch_one(db.pool())
            .await
            .is_err());

        db.run_migrations().await.unwrap();

        sqlx::query("SELECT COUNT(*) FROM products")
            .fetch_one(db.pool())
            .await
            .unwrap();
    }
}
