//! # HTTP Routes
//!
//! Handlers for the three route families:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Route Families                                 │
//! │                                                                         │
//! │  api    GET  /api/productos            public product list              │
//! │         POST /api/productos            create (session required)        │
//! │         GET  /api/buscar_producto      lookup by id / name / prefix     │
//! │         POST /api/ventas               register a sale                  │
//! │                                                                         │
//! │  panel  GET  /panel/productos          catalog view      ┐              │
//! │         POST /panel/productos/nuevo    create            │              │
//! │         GET  /panel/productos/{id}/editar                │ session-     │
//! │         POST /panel/productos/{id}/editar                │ gated via    │
//! │         POST /panel/productos/{id}/eliminar              │ CurrentUser  │
//! │         GET  /panel/dashboard          aggregates        │              │
//! │         GET  /panel/alertas            low-stock list    │              │
//! │         GET  /panel/pos                sale entry        │              │
//! │         GET  /panel/ventas             ledger            │              │
//! │         GET  /panel/ventas/exportar    CSV download      │              │
//! │         GET  /panel/ventas/{id}        sale detail       ┘              │
//! │                                                                         │
//! │  auth   GET  /panel/login              login form                       │
//! │         POST /panel/login              verify + set cookie              │
//! │         GET  /panel/logout             revoke + clear cookie            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Wire field names are the panel's Spanish vocabulary (`nombre`, `precio`,
//! `stock`, `cantidad`); the mapping happens in the DTOs here, never in the
//! domain types.

use axum::response::Redirect;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use gestio_core::Product;

pub mod api;
pub mod auth;
pub mod panel;

// =============================================================================
// Root
// =============================================================================

/// Plain-text banner at `/`.
pub async fn index() -> &'static str {
    "Gestio - Panel Web"
}

// =============================================================================
// Shared DTOs
// =============================================================================

/// Product as serialized on the wire.
#[derive(Debug, Serialize)]
pub struct ProductDto {
    pub id: String,
    pub nombre: String,
    pub nombre_lower: String,
    pub precio: f64,
    pub stock: i64,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        ProductDto {
            id: product.id,
            nombre: product.name,
            nombre_lower: product.name_lower,
            precio: product.price,
            stock: product.stock,
        }
    }
}

/// Product form fields, as submitted by the panel and the public API.
///
/// Everything stays `Option<String>` so validation owns the
/// missing/empty/garbage distinctions.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub nombre: Option<String>,
    pub precio: Option<String>,
    pub stock: Option<String>,
}

// =============================================================================
// Flash Redirects
// =============================================================================

/// Redirect to the catalog view with a notice banner.
pub fn redirect_with_notice(notice: &str) -> Redirect {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("notice", notice)
        .finish();
    Redirect::to(&format!("/panel/productos?{query}"))
}

/// Redirect to the catalog view with an error banner.
pub fn redirect_with_error(error: &str) -> Redirect {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("error", error)
        .finish();
    Redirect::to(&format!("/panel/productos?{query}"))
}
