//! # Auth Routes
//!
//! Login form, credential verification and logout. Failed logins answer
//! with one generic 401 for both unknown emails and wrong passwords;
//! deactivated accounts get a 403 so the operator knows to ask an admin
//! rather than retry.

use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiResult;
use crate::session::{clear_session_cookie, cookie_value, session_cookie, SESSION_COOKIE};
use crate::AppState;

/// Where a login without a usable `next` lands.
const DEFAULT_AFTER_LOGIN: &str = "/panel/productos";

// =============================================================================
// Requests & Views
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Login form view; `next` is echoed so the form can carry it through.
#[derive(Debug, Serialize)]
pub struct LoginView {
    pub next: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /panel/login?next=`: the login form.
pub async fn login_form(Query(params): Query<NextParam>) -> Json<LoginView> {
    Json(LoginView { next: params.next })
}

/// `POST /panel/login`: verify credentials and open a session.
pub async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let credential = state.auth.login(&form.email, &form.password)?;
    let token = state.sessions.issue(credential)?;

    info!(user = %credential.id, "Panel login");

    let target = sanitize_next(form.next.as_deref());
    Ok((
        [(header::SET_COOKIE, session_cookie(&token, state.sessions.ttl_secs()))],
        Redirect::to(&target),
    )
        .into_response())
}

/// `GET /panel/logout`: revoke the session and clear the cookie.
///
/// Deliberately not gated: a logout with a stale or absent cookie still
/// lands on the login form with the cookie cleared.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = cookie_value(&headers, SESSION_COOKIE) {
        state.sessions.logout(token);
        info!("Panel logout");
    }

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/panel/login"),
    )
        .into_response()
}

// =============================================================================
// Redirect Target
// =============================================================================

/// Picks the post-login destination.
///
/// Only local absolute paths are honored; anything that could leave the
/// site (full URLs, scheme-relative `//host`) falls back to the catalog.
fn sanitize_next(next: Option<&str>) -> String {
    match next {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => DEFAULT_AFTER_LOGIN.to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};

    use super::sanitize_next;
    use crate::testing::{
        body_json, get, login_cookie, post_form, test_state, ADMIN_EMAIL, ADMIN_PASSWORD,
        INACTIVE_EMAIL,
    };

    fn login_body(email: &str, password: &str, next: Option<&str>) -> String {
        let mut body = url::form_urlencoded::Serializer::new(String::new());
        body.append_pair("email", email).append_pair("password", password);
        if let Some(next) = next {
            body.append_pair("next", next);
        }
        body.finish()
    }

    #[test]
    fn test_sanitize_next() {
        assert_eq!(sanitize_next(Some("/panel/dashboard")), "/panel/dashboard");
        assert_eq!(sanitize_next(Some("/panel/ventas?from=2026-01-01")), "/panel/ventas?from=2026-01-01");
        assert_eq!(sanitize_next(None), "/panel/productos");
        assert_eq!(sanitize_next(Some("")), "/panel/productos");
        assert_eq!(sanitize_next(Some("https://evil.example/")), "/panel/productos");
        assert_eq!(sanitize_next(Some("//evil.example/")), "/panel/productos");
        assert_eq!(sanitize_next(Some("/\\evil.example")), "/panel/productos");
    }

    #[tokio::test]
    async fn test_login_sets_cookie_and_redirects() {
        let state = test_state().await;

        let response = post_form(
            &state,
            "/panel/login",
            None,
            &login_body(ADMIN_EMAIL, ADMIN_PASSWORD, None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/panel/productos");

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("gestio_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert_eq!(state.sessions.active_count(), 1);
    }

    #[tokio::test]
    async fn test_login_honors_local_next() {
        let state = test_state().await;

        let response = post_form(
            &state,
            "/panel/login",
            None,
            &login_body(ADMIN_EMAIL, ADMIN_PASSWORD, Some("/panel/dashboard")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/panel/dashboard");
    }

    #[tokio::test]
    async fn test_login_rejects_external_next() {
        let state = test_state().await;

        for next in ["https://evil.example/", "//evil.example/"] {
            let response = post_form(
                &state,
                "/panel/login",
                None,
                &login_body(ADMIN_EMAIL, ADMIN_PASSWORD, Some(next)),
            )
            .await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(response.headers()[header::LOCATION], "/panel/productos");
        }
    }

    #[tokio::test]
    async fn test_login_failures_stay_generic() {
        let state = test_state().await;

        // Unknown email and wrong password answer identically.
        for body in [
            login_body("nadie@gestio.test", ADMIN_PASSWORD, None),
            login_body(ADMIN_EMAIL, "wrong-password", None),
        ] {
            let response = post_form(&state, "/panel/login", None, &body).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(body_json(response).await["error"], "invalid credentials");
        }

        assert_eq!(state.sessions.active_count(), 0);
    }

    #[tokio::test]
    async fn test_login_inactive_account_is_403() {
        let state = test_state().await;

        // Correct password, deactivated account.
        let response = post_form(
            &state,
            "/panel/login",
            None,
            &login_body(INACTIVE_EMAIL, ADMIN_PASSWORD, None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["error"], "account is inactive");
    }

    #[tokio::test]
    async fn test_login_normalizes_email() {
        let state = test_state().await;

        let response = post_form(
            &state,
            "/panel/login",
            None,
            &login_body("  ADMIN@Gestio.Test ", ADMIN_PASSWORD, None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_login_form_echoes_next() {
        let state = test_state().await;

        let response = get(&state, "/panel/login?next=%2Fpanel%2Fdashboard", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["next"], "/panel/dashboard");

        let response = get(&state, "/panel/login", None).await;
        assert!(body_json(response).await["next"].is_null());
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let state = test_state().await;
        let cookie = login_cookie(&state);

        // The cookie works...
        let response = get(&state, "/panel/dashboard", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);

        // ...until logout...
        let response = get(&state, "/panel/logout", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/panel/login");
        let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.contains("Max-Age=0"));
        assert_eq!(state.sessions.active_count(), 0);

        // ...after which the very same cookie is a stranger again.
        let response = get(&state, "/panel/dashboard", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/panel/login?next=%2Fpanel%2Fdashboard"
        );
    }

    #[tokio::test]
    async fn test_logout_without_cookie_still_lands_on_login() {
        let state = test_state().await;

        let response = get(&state, "/panel/logout", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/panel/login");
    }
}
