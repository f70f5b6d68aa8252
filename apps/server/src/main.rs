//! # Gestio Server
//!
//! HTTP entrypoint: loads configuration, opens the database, provisions
//! the credential store and serves the panel until SIGINT/SIGTERM.

use std::net::SocketAddr;

use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use gestio_db::{Database, DbConfig};
use gestio_server::auth::CredentialStore;
use gestio_server::config::{ServerConfig, DEV_SESSION_SECRET};
use gestio_server::{app, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Gestio server...");

    let config = ServerConfig::load()?;
    info!(
        port = config.http_port,
        db = %config.database_path,
        threshold = config.stock_threshold,
        "Configuration loaded from environment"
    );

    if config.session_secret == DEV_SESSION_SECRET {
        warn!("SESSION_SECRET is not set; using the development fallback key");
    }

    // Open database (migrations run on connect)
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    // Provision credentials
    let store = CredentialStore::load(&config)?;
    if store.is_empty() {
        warn!("Credential store is empty; every panel login will be rejected");
    } else {
        info!(users = store.len(), "Credential store loaded");
    }

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let state = AppState::new(db, store, config);

    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Log filtering via `RUST_LOG`:
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=gestio=trace` - Show trace for gestio crates only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gestio=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
