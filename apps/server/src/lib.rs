//! # gestio-server: HTTP Panel & Public API
//!
//! The axum application serving Gestio's two HTTP faces: the public
//! storefront API and the session-gated management panel.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        gestio-server                                    │
//! │                                                                         │
//! │   HTTP request                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   TraceLayer ── CorsLayer                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   Router ──────────────┬───────────────────┐                            │
//! │       │                │                   │                            │
//! │   routes::api     routes::panel       routes::auth                      │
//! │       │                │ (CurrentUser)     │                            │
//! │       │                │                   ├── auth::Authenticator      │
//! │       │                │                   └── session::SessionManager  │
//! │       ▼                ▼                                                │
//! │   services: CatalogService ── SaleService ── ReportService              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   gestio-core (validation, reports) + gestio-db (repositories)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! State is one cheaply-cloneable [`AppState`]; services are built on
//! demand from the repositories it carries.

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use gestio_db::Database;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod session;

use auth::{Authenticator, CredentialStore};
use config::ServerConfig;
use services::{CatalogService, ReportService, SaleService};
use session::SessionManager;

// =============================================================================
// Application State
// =============================================================================

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: Arc<Authenticator>,
    pub sessions: Arc<SessionManager>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, store: CredentialStore, config: ServerConfig) -> Self {
        let sessions = SessionManager::new(&config.session_secret, config.session_ttl_secs);

        AppState {
            db,
            auth: Arc::new(Authenticator::new(store)),
            sessions: Arc::new(sessions),
            config: Arc::new(config),
        }
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.db.products())
    }

    pub fn sales(&self) -> SaleService {
        SaleService::new(self.db.products(), self.db.sales())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.db.products(), self.db.sales(), self.config.stock_threshold)
    }
}

// =============================================================================
// Router
// =============================================================================

/// Builds the application router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        );

    Router::new()
        .route("/", get(routes::index))
        // Public API.
        .route("/api/productos", get(routes::api::list_products).post(routes::api::create_product))
        .route("/api/buscar_producto", get(routes::api::find_product))
        .route("/api/ventas", post(routes::api::register_sale))
        // Sessions.
        .route("/panel/login", get(routes::auth::login_form).post(routes::auth::login_submit))
        .route("/panel/logout", get(routes::auth::logout))
        // Panel catalog.
        .route("/panel/productos", get(routes::panel::products))
        .route("/panel/productos/nuevo", post(routes::panel::create_product))
        .route(
            "/panel/productos/{id}/editar",
            get(routes::panel::edit_product_form).post(routes::panel::update_product),
        )
        .route("/panel/productos/{id}/eliminar", post(routes::panel::delete_product))
        // Panel reports & ledger.
        .route("/panel/dashboard", get(routes::panel::dashboard))
        .route("/panel/alertas", get(routes::panel::alerts))
        .route("/panel/pos", get(routes::panel::pos))
        .route("/panel/ventas", get(routes::panel::sales))
        .route("/panel/ventas/exportar", get(routes::panel::export_sales))
        .route("/panel/ventas/{id}", get(routes::panel::sale_detail))
        .with_state(state)
        .layer(middleware)
}

// =============================================================================
// Test Support
// =============================================================================
