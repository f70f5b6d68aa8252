//! # Public API Routes
//!
//! The JSON/form surface consumed by the storefront page and scripts:
//! product listing and lookup, product creation, sale registration.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, Query, State};
use axum::response::{IntoResponse, Json, Redirect};
use serde::Deserialize;
use serde_json::json;

use gestio_core::SaleLine;

use crate::error::{ApiError, ApiResult};
use crate::routes::{ProductDto, ProductForm};
use crate::session::CurrentUser;
use crate::AppState;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Sale registration payload.
///
/// `total` has no default: a cart without a total is malformed and is
/// rejected by the JSON extractor.
#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    #[serde(default)]
    pub items: Vec<SaleLine>,
    pub total: f64,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/productos`: the whole catalog, no session required.
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductDto>>> {
    let products = state.catalog().list().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// `POST /api/productos`: create a product, then land on the panel catalog.
pub async fn create_product(
    _user: CurrentUser,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> ApiResult<Redirect> {
    state
        .catalog()
        .create(form.nombre.as_deref(), form.precio.as_deref(), form.stock.as_deref())
        .await?;

    Ok(Redirect::to("/panel/productos"))
}

/// `GET /api/buscar_producto?q=`: lookup by exact id, exact name or prefix.
pub async fn find_product(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<ProductDto>> {
    let product = state.catalog().find(params.q.as_deref()).await?;
    Ok(Json(ProductDto::from(product)))
}

/// `POST /api/ventas`: register a sale from the storefront cart.
///
/// Every rejection is a 400: a cart referencing a product that no longer
/// exists is a bad cart, not a missing resource.
pub async fn register_sale(
    State(state): State<AppState>,
    payload: Result<Json<SaleRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;

    state
        .sales()
        .register(&request.items, request.total)
        .await
        .map_err(ApiError::into_sale_rejection)?;

    Ok(Json(json!({ "ok": true })))
}

// =============================================================================
// Tests
// =============================================================================
