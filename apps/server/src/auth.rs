//! # Credential Store & Authenticator
//!
//! Login verification against the credentials provisioned at startup.
//!
//! ## Login Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Login Flow                                     │
//! │                                                                         │
//! │  POST /panel/login { email, password }                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize_email(email)  ──  trim + lowercase, the store's natural key  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CredentialStore.get(key) ──── None ──────────► AuthError::Unknown…     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  active? ───────────────────── false ─────────► AuthError::Account…     │
//! │       │   (checked BEFORE the hash: a deactivated account is            │
//! │       │    rejected even with the right password)                       │
//! │       ▼                                                                 │
//! │  argon2 verify ─────────────── mismatch ──────► AuthError::Invalid…     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ok(&Credential) ── caller issues a session                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is read-only after startup. Accounts are provisioned
//! out-of-band with the `adduser` binary and handed to the server via
//! `USERS_JSON` (inline array) or `USERS_FILE` (path to the same JSON).

use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use gestio_core::types::{normalize_email, Credential, Role};
use gestio_core::AuthError;

use crate::config::ServerConfig;

// =============================================================================
// Password Hashing
// =============================================================================

/// Verify a password against its argon2 PHC hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, StoreError> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StoreError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

// =============================================================================
// Credential Store
// =============================================================================

/// One element of the credential JSON array.
///
/// `role` and `active` may be omitted; they default to `admin` / `true`
/// (the panel's historical single-operator setup).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCredential {
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl From<RawCredential> for Credential {
    fn from(raw: RawCredential) -> Self {
        Credential::new(&raw.email, raw.password_hash, raw.role, raw.active)
    }
}

/// In-memory credential map keyed by normalized email.
#[derive(Debug, Default)]
pub struct CredentialStore {
    by_id: HashMap<String, Credential>,
}

impl CredentialStore {
    /// Loads credentials per configuration.
    ///
    /// `USERS_JSON` wins over `USERS_FILE`; with neither set the store is
    /// empty and every login fails closed (the caller logs the warning).
    pub fn load(config: &ServerConfig) -> Result<Self, StoreError> {
        if let Some(json) = &config.users_json {
            return Self::from_json(json);
        }

        if let Some(path) = &config.users_file {
            let json = fs::read_to_string(path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            return Self::from_json(&json);
        }

        Ok(CredentialStore::default())
    }

    /// Parses a JSON credential array.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let raw: Vec<RawCredential> = serde_json::from_str(json)?;
        Ok(Self::from_credentials(raw.into_iter().map(Credential::from)))
    }

    /// Builds a store from already-constructed credentials.
    ///
    /// The last entry wins on duplicate emails.
    pub fn from_credentials(credentials: impl IntoIterator<Item = Credential>) -> Self {
        let by_id = credentials
            .into_iter()
            .map(|cred| (cred.id.clone(), cred))
            .collect();
        CredentialStore { by_id }
    }

    /// Looks up a credential by its normalized email key.
    pub fn get(&self, id: &str) -> Option<&Credential> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Credential store loading errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read credential file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse credential JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to hash password: {0}")]
    Hash(String),
}

// =============================================================================
// Authenticator
// =============================================================================

/// Verifies submitted credentials against the store.
#[derive(Debug)]
pub struct Authenticator {
    store: CredentialStore,
}

impl Authenticator {
    pub fn new(store: CredentialStore) -> Self {
        Authenticator { store }
    }

    /// Looks up a credential by email (normalized before the lookup).
    pub fn credential(&self, email: &str) -> Option<&Credential> {
        self.store.get(&normalize_email(email))
    }

    /// Verifies a login attempt.
    ///
    /// The active flag is checked before the hash: a deactivated account
    /// is rejected as inactive even when the password is correct.
    pub fn login(&self, email: &str, password: &str) -> Result<&Credential, AuthError> {
        let key = normalize_email(email);

        let Some(credential) = self.store.get(&key) else {
            warn!(email = %key, "Login rejected: unknown account");
            return Err(AuthError::UnknownAccount);
        };

        if !credential.active {
            warn!(email = %key, "Login rejected: account inactive");
            return Err(AuthError::AccountInactive);
        }

        if !verify_password(password, &credential.password_hash) {
            warn!(email = %key, "Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(credential)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
