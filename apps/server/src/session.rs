//! # Session Manager
//!
//! Cookie-backed panel sessions: a signed JWT carried in an HttpOnly
//! cookie, paired with a server-side active-session map.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Lifecycle                                │
//! │                                                                         │
//! │  login ──► issue()                                                      │
//! │              │  sign Claims { sub, jti, iat, exp } (HS256)              │
//! │              │  insert jti → Session into the active map                │
//! │              ▼                                                          │
//! │         Set-Cookie: gestio_session=<token>; HttpOnly                    │
//! │                                                                         │
//! │  request ──► authenticate(token)                                        │
//! │              │  verify signature + expiry                               │
//! │              │  jti must still be in the active map                     │
//! │              ▼                                                          │
//! │         Some(Session) │ None → redirect to /panel/login?next=...        │
//! │                                                                         │
//! │  logout ──► logout(token)                                               │
//! │              │  verify signature (expiry ignored), remove jti           │
//! │              ▼                                                          │
//! │         Set-Cookie: gestio_session=; Max-Age=0                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The active map is the revocation authority: a token that verifies
//! cryptographically but whose `jti` is absent (logged out, or the server
//! restarted) is not a session.

use std::collections::HashMap;
use std::sync::RwLock;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::Redirect;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;
use uuid::Uuid;

use gestio_core::types::{Credential, Role};

use crate::AppState;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "gestio_session";

// =============================================================================
// Session & Claims
// =============================================================================

/// An authenticated panel session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

/// JWT payload.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the credential's normalized email key.
    sub: String,
    email: String,
    role: Role,
    active: bool,
    /// Token id, the key into the active-session map.
    jti: String,
    /// Issued-at (Unix seconds).
    iat: i64,
    /// Expiry (Unix seconds).
    exp: i64,
}

/// Session signing failures.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to sign session token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

// =============================================================================
// Session Manager
// =============================================================================

/// Issues, validates and revokes panel sessions.
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
    /// jti → session. Deliberately in-memory: restarting the server
    /// invalidates every outstanding cookie.
    active: RwLock<HashMap<String, Session>>,
}

impl SessionManager {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        SessionManager {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Signs a fresh token for the credential and registers it active.
    pub fn issue(&self, credential: &Credential) -> Result<String, SessionError> {
        let now = Utc::now().timestamp();
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: credential.id.clone(),
            email: credential.email.clone(),
            role: credential.role,
            active: credential.active,
            jti: jti.clone(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;

        let session = Session {
            user_id: credential.id.clone(),
            email: credential.email.clone(),
            role: credential.role,
            active: credential.active,
        };
        if let Ok(mut map) = self.active.write() {
            map.insert(jti, session);
        }

        Ok(token)
    }

    /// Resolves a token to its session.
    ///
    /// Requires a valid signature, an unexpired token AND a live entry in
    /// the active map.
    pub fn authenticate(&self, token: &str) -> Option<Session> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default()).ok()?;

        self.active
            .read()
            .ok()
            .and_then(|map| map.get(&data.claims.jti).cloned())
    }

    /// Revokes the token's session.
    ///
    /// Expiry is ignored so an already-expired cookie can still be logged
    /// out; the signature check stays.
    pub fn logout(&self, token: &str) {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        if let Ok(data) = decode::<Claims>(token, &self.decoding_key, &validation) {
            if let Ok(mut map) = self.active.write() {
                map.remove(&data.claims.jti);
            }
        }
    }

    /// Number of live sessions.
    pub fn active_count(&self) -> usize {
        self.active.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }
}

// =============================================================================
// Cookie Helpers
// =============================================================================

/// `Set-Cookie` value installing a session token.
pub fn session_cookie(token: &str, ttl_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_secs}")
}

/// `Set-Cookie` value clearing the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Extracts one cookie's value from a request's headers.
pub fn cookie_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

// =============================================================================
// Extractor
// =============================================================================

/// Extractor gating panel handlers on a live session.
///
/// Absent or dead sessions redirect to the login form with the requested
/// path (including its query) echoed in `next`.
pub struct CurrentUser(pub Session);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = cookie_value(&parts.headers, SESSION_COOKIE)
            .and_then(|token| state.sessions.authenticate(token));

        match session {
            Some(session) => Ok(CurrentUser(session)),
            None => {
                let destination = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or_else(|| parts.uri.path());
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("next", destination)
                    .finish();
                Err(Redirect::to(&format!("/panel/login?{query}")))
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
