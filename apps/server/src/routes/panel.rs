//! # Panel Routes
//!
//! The operator's management views: catalog CRUD, dashboard, low-stock
//! alerts, the POS entry view, the sales ledger and its CSV export.
//!
//! Every handler here requires a live session (the [`CurrentUser`]
//! extractor redirects to the login form otherwise). Mutations follow the
//! flash-redirect convention: success and missing-product outcomes land
//! back on the catalog view with a `notice`/`error` banner in the query
//! string, while validation failures stay a 400 so the form can mark the
//! offending fields.

use axum::extract::{Form, Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use gestio_core::report::format_sale_timestamp;
use gestio_core::{LowStockProduct, Product, SaleLine, SaleSummary};

use crate::error::{ApiResult, ErrorCode};
use crate::routes::{redirect_with_error, redirect_with_notice, ProductDto, ProductForm};
use crate::session::CurrentUser;
use crate::AppState;

// =============================================================================
// View Models
// =============================================================================

/// Catalog view with optional flash banners.
#[derive(Debug, Serialize)]
pub struct ProductListView {
    pub productos: Vec<ProductDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Edit form view.
#[derive(Debug, Serialize)]
pub struct EditProductView {
    pub producto: ProductDto,
}

/// Dashboard aggregates.
#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub total_productos: usize,
    pub bajo_stock: usize,
    pub valor_inventario: f64,
    pub top_bajo_stock: Vec<LowStockDto>,
    pub umbral: i64,
}

/// Low-stock alert list.
#[derive(Debug, Serialize)]
pub struct AlertsView {
    pub productos: Vec<LowStockDto>,
    pub umbral: i64,
}

/// POS entry view: the catalog as the in-panel sale form sees it.
#[derive(Debug, Serialize)]
pub struct PosView {
    pub productos: Vec<ProductDto>,
}

/// Sales ledger.
#[derive(Debug, Serialize)]
pub struct SalesView {
    pub ventas: Vec<SaleSummaryDto>,
}

/// One sale with its lines.
#[derive(Debug, Serialize)]
pub struct SaleDetailView {
    pub id: String,
    pub fecha: String,
    pub total: f64,
    pub items: Vec<SaleLine>,
}

#[derive(Debug, Serialize)]
pub struct LowStockDto {
    pub id: String,
    pub nombre: String,
    pub stock: i64,
}

impl From<LowStockProduct> for LowStockDto {
    fn from(entry: LowStockProduct) -> Self {
        LowStockDto {
            id: entry.id,
            nombre: entry.name,
            stock: entry.stock,
        }
    }
}

impl From<Product> for LowStockDto {
    fn from(product: Product) -> Self {
        LowStockDto {
            id: product.id,
            nombre: product.name,
            stock: product.stock,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaleSummaryDto {
    pub id: String,
    pub fecha: String,
    pub items: i64,
    pub total: f64,
}

impl From<SaleSummary> for SaleSummaryDto {
    fn from(summary: SaleSummary) -> Self {
        SaleSummaryDto {
            id: summary.id,
            fecha: format_sale_timestamp(summary.created_at),
            items: summary.item_count,
            total: summary.total,
        }
    }
}

// =============================================================================
// Query Params
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct FlashParams {
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

// =============================================================================
// Catalog Handlers
// =============================================================================

/// `GET /panel/productos`: the catalog with any flash banner echoed back.
pub async fn products(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(flash): Query<FlashParams>,
) -> ApiResult<Json<ProductListView>> {
    let products = state.catalog().list().await?;

    Ok(Json(ProductListView {
        productos: products.into_iter().map(ProductDto::from).collect(),
        notice: flash.notice,
        error: flash.error,
    }))
}

/// `POST /panel/productos/nuevo`: create from the panel form.
pub async fn create_product(
    _user: CurrentUser,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> ApiResult<Response> {
    state
        .catalog()
        .create(form.nombre.as_deref(), form.precio.as_deref(), form.stock.as_deref())
        .await?;

    Ok(redirect_with_notice("Producto creado").into_response())
}

/// `GET /panel/productos/{id}/editar`: the edit form's view of one product.
///
/// A missing product bounces back to the catalog with an error banner
/// instead of a bare 404; the operator probably deleted it in another tab.
pub async fn edit_product_form(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    match state.catalog().get(&id).await {
        Ok(product) => Ok(Json(EditProductView {
            producto: ProductDto::from(product),
        })
        .into_response()),
        Err(err) if err.code == ErrorCode::NotFound => {
            Ok(redirect_with_error("Producto no encontrado").into_response())
        }
        Err(err) => Err(err),
    }
}

/// `POST /panel/productos/{id}/editar`: overwrite one product.
pub async fn update_product(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> ApiResult<Response> {
    let update = state
        .catalog()
        .update(&id, form.nombre.as_deref(), form.precio.as_deref(), form.stock.as_deref())
        .await;

    match update {
        Ok(_) => Ok(redirect_with_notice("Producto actualizado").into_response()),
        Err(err) if err.code == ErrorCode::NotFound => {
            Ok(redirect_with_error("Producto no encontrado").into_response())
        }
        Err(err) => Err(err),
    }
}

/// `POST /panel/productos/{id}/eliminar`: delete one product.
pub async fn delete_product(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    match state.catalog().delete(&id).await {
        Ok(()) => Ok(redirect_with_notice("Producto eliminado").into_response()),
        Err(err) if err.code == ErrorCode::NotFound => {
            Ok(redirect_with_error("Producto no encontrado").into_response())
        }
        Err(err) => Err(err),
    }
}

// =============================================================================
// Report Handlers
// =============================================================================

/// `GET /panel/dashboard`: catalog-wide aggregates.
pub async fn dashboard(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> ApiResult<Json<DashboardView>> {
    let reports = state.reports();
    let metrics = reports.dashboard().await?;

    Ok(Json(DashboardView {
        total_productos: metrics.total_products,
        bajo_stock: metrics.low_stock_count,
        valor_inventario: metrics.inventory_value,
        top_bajo_stock: metrics.top_low_stock.into_iter().map(LowStockDto::from).collect(),
        umbral: reports.threshold(),
    }))
}

/// `GET /panel/alertas`: every product under the threshold, lowest first.
pub async fn alerts(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> ApiResult<Json<AlertsView>> {
    let reports = state.reports();
    let products = reports.low_stock().await?;

    Ok(Json(AlertsView {
        productos: products.into_iter().map(LowStockDto::from).collect(),
        umbral: reports.threshold(),
    }))
}

/// `GET /panel/pos`: the catalog for the in-panel sale form.
pub async fn pos(_user: CurrentUser, State(state): State<AppState>) -> ApiResult<Json<PosView>> {
    let products = state.catalog().list().await?;

    Ok(Json(PosView {
        productos: products.into_iter().map(ProductDto::from).collect(),
    }))
}

// =============================================================================
// Ledger Handlers
// =============================================================================

/// `GET /panel/ventas?from=&to=`: the ledger, optionally date-filtered.
pub async fn sales(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(range): Query<RangeParams>,
) -> ApiResult<Json<SalesView>> {
    let summaries = state
        .reports()
        .sales_between(range.from.as_deref(), range.to.as_deref())
        .await?;

    Ok(Json(SalesView {
        ventas: summaries.into_iter().map(SaleSummaryDto::from).collect(),
    }))
}

/// `GET /panel/ventas/{id}`: one sale with its lines.
pub async fn sale_detail(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleDetailView>> {
    let sale = state.reports().sale_detail(&id).await?;

    Ok(Json(SaleDetailView {
        id: sale.id,
        fecha: format_sale_timestamp(sale.created_at),
        total: sale.total,
        items: sale.lines,
    }))
}

/// `GET /panel/ventas/exportar?from=&to=`: the filtered ledger as CSV.
pub async fn export_sales(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(range): Query<RangeParams>,
) -> ApiResult<Response> {
    let csv = state
        .reports()
        .export_csv(range.from.as_deref(), range.to.as_deref())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"ventas.csv\""),
        ],
        csv,
    )
        .into_response())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use serde_json::json;

    use gestio_core::types::NewProduct;
    use gestio_core::{Product, SaleLine};

    use crate::testing::{body_json, body_text, get, login_cookie, post_form, test_state};
    use crate::AppState;

    async fn seed(state: &AppState, name: &str, price: f64, stock: i64) -> Product {
        state
            .db
            .products()
            .insert(&NewProduct::new(name, price, stock))
            .await
            .unwrap()
    }

    async fn register_sale(state: &AppState, product_id: &str, quantity: i64, total: f64) -> String {
        let lines = vec![SaleLine {
            product_id: product_id.to_string(),
            quantity,
        }];
        state.db.sales().register(&lines, total).await.unwrap().id
    }

    #[tokio::test]
    async fn test_panel_requires_session() {
        let state = test_state().await;

        let response = get(&state, "/panel/dashboard", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/panel/login?next=%2Fpanel%2Fdashboard"
        );
    }

    #[tokio::test]
    async fn test_stale_cookie_redirects_with_query_in_next() {
        let state = test_state().await;

        let response = get(&state, "/panel/ventas?from=2026-01-01", Some("gestio_session=stale")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/panel/login?next=%2Fpanel%2Fventas%3Ffrom%3D2026-01-01"
        );
    }

    #[tokio::test]
    async fn test_products_view_echoes_flash() {
        let state = test_state().await;
        let cookie = login_cookie(&state);
        seed(&state, "Yerba Mate 1kg", 8.5, 12).await;

        let response = get(&state, "/panel/productos?notice=Producto+creado", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["productos"][0]["nombre"], "Yerba Mate 1kg");
        assert_eq!(body["notice"], "Producto creado");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_create_product_redirects_with_notice() {
        let state = test_state().await;
        let cookie = login_cookie(&state);

        let response = post_form(
            &state,
            "/panel/productos/nuevo",
            Some(&cookie),
            "nombre=Az%C3%BAcar&precio=2.00&stock=30",
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/panel/productos?notice=Producto+creado"
        );

        let response = get(&state, "/panel/productos", Some(&cookie)).await;
        let body = body_json(response).await;
        assert_eq!(body["productos"][0]["nombre"], "Azúcar");
    }

    #[tokio::test]
    async fn test_create_product_validation_stays_400() {
        let state = test_state().await;
        let cookie = login_cookie(&state);

        let response = post_form(&state, "/panel/productos/nuevo", Some(&cookie), "nombre=&precio=&stock=").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 3);
    }

    #[tokio::test]
    async fn test_edit_form_shows_product() {
        let state = test_state().await;
        let cookie = login_cookie(&state);
        let product = seed(&state, "Yerba Mate 1kg", 8.5, 12).await;

        let response = get(&state, &format!("/panel/productos/{}/editar", product.id), Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["producto"]["id"], json!(product.id));
        assert_eq!(body["producto"]["precio"], 8.5);
    }

    #[tokio::test]
    async fn test_edit_form_missing_product_bounces_back() {
        let state = test_state().await;
        let cookie = login_cookie(&state);

        let response = get(&state, "/panel/productos/ghost/editar", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/panel/productos?error=Producto+no+encontrado"
        );
    }

    #[tokio::test]
    async fn test_update_product_flow() {
        let state = test_state().await;
        let cookie = login_cookie(&state);
        let product = seed(&state, "Yerba Mate 1kg", 8.5, 12).await;

        let response = post_form(
            &state,
            &format!("/panel/productos/{}/editar", product.id),
            Some(&cookie),
            "nombre=Yerba+Mate+500g&precio=4.75&stock=20",
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/panel/productos?notice=Producto+actualizado"
        );

        // The next read sees the new values.
        let response = get(&state, "/panel/productos", Some(&cookie)).await;
        let body = body_json(response).await;
        assert_eq!(body["productos"][0]["nombre"], "Yerba Mate 500g");
        assert_eq!(body["productos"][0]["precio"], 4.75);
        assert_eq!(body["productos"][0]["stock"], 20);
    }

    #[tokio::test]
    async fn test_update_product_validation_stays_400() {
        let state = test_state().await;
        let cookie = login_cookie(&state);
        let product = seed(&state, "Yerba Mate 1kg", 8.5, 12).await;

        let response = post_form(
            &state,
            &format!("/panel/productos/{}/editar", product.id),
            Some(&cookie),
            "nombre=Yerba&precio=-1&stock=x",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let errors = body["errors"].as_array().unwrap();
        assert!(errors.iter().any(|e| e == "precio cannot be negative"));
        assert!(errors.iter().any(|e| e == "stock must be a whole number"));
    }

    #[tokio::test]
    async fn test_update_missing_product_bounces_back() {
        let state = test_state().await;
        let cookie = login_cookie(&state);

        let response = post_form(
            &state,
            "/panel/productos/ghost/editar",
            Some(&cookie),
            "nombre=Yerba&precio=1&stock=1",
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/panel/productos?error=Producto+no+encontrado"
        );
    }

    #[tokio::test]
    async fn test_delete_product_then_again() {
        let state = test_state().await;
        let cookie = login_cookie(&state);
        let product = seed(&state, "Yerba Mate 1kg", 8.5, 12).await;
        let path = format!("/panel/productos/{}/eliminar", product.id);

        let response = post_form(&state, &path, Some(&cookie), "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/panel/productos?notice=Producto+eliminado"
        );
        assert_eq!(state.db.products().count().await.unwrap(), 0);

        // Deleting again reports the miss as a banner, not a 404.
        let response = post_form(&state, &path, Some(&cookie), "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/panel/productos?error=Producto+no+encontrado"
        );
    }

    #[tokio::test]
    async fn test_dashboard_numbers() {
        let state = test_state().await;
        let cookie = login_cookie(&state);
        seed(&state, "Agotado", 3.0, 0).await;
        seed(&state, "Bajo", 1.0, 2).await;
        seed(&state, "Sano", 2.0, 10).await;

        let response = get(&state, "/panel/dashboard", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["total_productos"], 3);
        assert_eq!(body["bajo_stock"], 2);
        // 3×0 + 1×2 + 2×10
        assert_eq!(body["valor_inventario"], 22.0);
        assert_eq!(body["umbral"], 5);

        // Shortlist ascends by stock.
        let top = body["top_bajo_stock"].as_array().unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0]["nombre"], "Agotado");
        assert_eq!(top[0]["stock"], 0);
        assert_eq!(top[1]["nombre"], "Bajo");
        assert_eq!(top[1]["stock"], 2);
    }

    #[tokio::test]
    async fn test_alerts_ascend_by_stock() {
        let state = test_state().await;
        let cookie = login_cookie(&state);
        seed(&state, "Casi", 1.0, 4).await;
        seed(&state, "Critico", 1.0, 1).await;
        seed(&state, "Sano", 1.0, 9).await;

        let response = get(&state, "/panel/alertas", Some(&cookie)).await;
        let body = body_json(response).await;

        let alerts = body["productos"].as_array().unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0]["nombre"], "Critico");
        assert_eq!(alerts[1]["nombre"], "Casi");
        assert_eq!(body["umbral"], 5);
    }

    #[tokio::test]
    async fn test_pos_lists_catalog() {
        let state = test_state().await;
        let cookie = login_cookie(&state);
        seed(&state, "Yerba Mate 1kg", 8.5, 12).await;

        let response = get(&state, "/panel/pos", Some(&cookie)).await;
        let body = body_json(response).await;
        assert_eq!(body["productos"][0]["nombre"], "Yerba Mate 1kg");
    }

    #[tokio::test]
    async fn test_sales_ledger_newest_first() {
        let state = test_state().await;
        let cookie = login_cookie(&state);
        let product = seed(&state, "Yerba Mate 1kg", 8.5, 12).await;
        register_sale(&state, &product.id, 1, 8.5).await;
        register_sale(&state, &product.id, 2, 17.0).await;

        let response = get(&state, "/panel/ventas", Some(&cookie)).await;
        let body = body_json(response).await;

        let sales = body["ventas"].as_array().unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0]["total"], 17.0);
        assert_eq!(sales[0]["items"], 2);
        assert_eq!(sales[1]["total"], 8.5);
        assert!(sales[0]["fecha"].as_str().unwrap().len() == "2026-01-01 00:00".len());
    }

    #[tokio::test]
    async fn test_sales_date_filters() {
        let state = test_state().await;
        let cookie = login_cookie(&state);
        let product = seed(&state, "Yerba Mate 1kg", 8.5, 12).await;
        register_sale(&state, &product.id, 1, 8.5).await;

        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let tomorrow = (chrono::Utc::now() + chrono::Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();

        let response = get(&state, &format!("/panel/ventas?from={today}&to={today}"), Some(&cookie)).await;
        let body = body_json(response).await;
        assert_eq!(body["ventas"].as_array().unwrap().len(), 1);

        let response = get(&state, &format!("/panel/ventas?from={tomorrow}"), Some(&cookie)).await;
        let body = body_json(response).await;
        assert_eq!(body["ventas"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_sales_bad_dates_report_both_fields() {
        let state = test_state().await;
        let cookie = login_cookie(&state);

        let response = get(&state, "/panel/ventas?from=nope&to=2026-13-40", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(
            body["errors"],
            json!([
                "from must be a date in YYYY-MM-DD format",
                "to must be a date in YYYY-MM-DD format"
            ])
        );
    }

    #[tokio::test]
    async fn test_sale_detail_shape() {
        let state = test_state().await;
        let cookie = login_cookie(&state);
        let product = seed(&state, "Yerba Mate 1kg", 8.5, 12).await;
        let sale_id = register_sale(&state, &product.id, 3, 25.5).await;

        let response = get(&state, &format!("/panel/ventas/{sale_id}"), Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["id"], json!(sale_id));
        assert_eq!(body["total"], 25.5);
        assert_eq!(body["items"], json!([{ "id": product.id, "cantidad": 3 }]));
        assert!(body["fecha"].is_string());
    }

    #[tokio::test]
    async fn test_sale_detail_missing_is_404() {
        let state = test_state().await;
        let cookie = login_cookie(&state);

        let response = get(&state, "/panel/ventas/ghost", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Sale not found: ghost");
    }

    #[tokio::test]
    async fn test_export_csv() {
        let state = test_state().await;
        let cookie = login_cookie(&state);
        let product = seed(&state, "Yerba Mate 1kg", 8.5, 12).await;
        let older = register_sale(&state, &product.id, 2, 17.0).await;
        let newer = register_sale(&state, &product.id, 1, 8.5).await;

        let response = get(&state, "/panel/ventas/exportar", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"ventas.csv\""
        );

        // Header, then rows newest first.
        let csv = body_text(response).await;
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,date,items,total"));

        let row = lines.next().unwrap();
        assert!(row.starts_with(&format!("{newer},")));
        assert!(row.ends_with(",1,8.50"));

        let row = lines.next().unwrap();
        assert!(row.starts_with(&format!("{older},")));
        assert!(row.ends_with(",2,17.00"));

        assert_eq!(lines.next(), None);
    }
}
