//! # Domain Types
//!
//! Core domain types used throughout Gestio.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │   Credential    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (email)     │       │
//! │  │  name           │   │  lines[]        │   │  password_hash  │       │
//! │  │  name_lower     │   │  total          │   │  role           │       │
//! │  │  price / stock  │   │  created_at     │   │  active         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   SaleLine      │   │  SaleSummary    │   │ DashboardMetrics│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  id, total      │   │  totals, value  │       │
//! │  │  quantity       │   │  item_count     │   │  top_low_stock  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! The panel's JSON contract predates this codebase and speaks Spanish
//! (`id`/`cantidad` on sale lines). Serde renames pin those names here,
//! in one place, so the rest of the code stays in English.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// ## The `name_lower` Twin
/// `name_lower` is always `lowercase(trim(name))`. It exists so prefix
/// search can run case-insensitively against an indexed column. It is
/// derived in [`NewProduct::new`] and never written independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4), assigned by the repository on create.
    pub id: String,

    /// Display name shown in the panel.
    pub name: String,

    /// Lowercase twin of `name`, kept in sync on every write.
    pub name_lower: String,

    /// Unit price. Non-negative, finite.
    pub price: f64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether this product falls under the low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock < threshold
    }

    /// Whether current stock covers the requested quantity.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }

    /// Value of the stock on hand (`price × stock`).
    #[inline]
    pub fn inventory_value(&self) -> f64 {
        self.price * self.stock as f64
    }
}

// =============================================================================
// New Product
// =============================================================================

/// Validated field set for creating or updating a product.
///
/// Construction is the only place `name_lower` is computed; going through
/// [`NewProduct::new`] is what keeps the invariant airtight.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub name_lower: String,
    pub price: f64,
    pub stock: i64,
}

impl NewProduct {
    /// Builds a product payload, trimming the name and deriving `name_lower`.
    ///
    /// ## Example
    /// ```rust
    /// use gestio_core::types::NewProduct;
    ///
    /// let p = NewProduct::new("  Café Molido 500g ", 6.25, 30);
    /// assert_eq!(p.name, "Café Molido 500g");
    /// assert_eq!(p.name_lower, "café molido 500g");
    /// ```
    pub fn new(name: &str, price: f64, stock: i64) -> Self {
        let name = name.trim().to_string();
        let name_lower = name.to_lowercase();
        NewProduct {
            name,
            name_lower,
            price,
            stock,
        }
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// One line of a sale: a product reference and a quantity.
///
/// Wire format is `{"id": ..., "cantidad": ...}`, the names the
/// point-of-sale screen has always submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    #[serde(rename = "id")]
    pub product_id: String,

    #[serde(rename = "cantidad")]
    pub quantity: i64,
}

// =============================================================================
// Sale
// =============================================================================

/// An immutable ledger entry: items sold, caller-supplied total, and a
/// server-assigned timestamp. Sales are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Line items in submission order.
    pub lines: Vec<SaleLine>,
    /// Total as submitted by the caller; never recomputed from the lines.
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Summary
// =============================================================================

/// Aggregated view of one sale for the ledger listing and CSV export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleSummary {
    pub id: String,
    /// Sum of quantities across the sale's lines.
    pub item_count: i64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Role
// =============================================================================

/// Access role carried by a credential and its sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Default for Role {
    fn default() -> Self {
        Role::Admin
    }
}

// =============================================================================
// Credential
// =============================================================================

/// A stored login credential.
///
/// Provisioned out-of-band (see the `adduser` tool); the running
/// application only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Natural key: always `lowercase(trim(email))`.
    pub id: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
    /// Deactivated accounts keep their record but cannot log in.
    pub active: bool,
}

impl Credential {
    /// Builds a credential, normalizing the email into the natural key.
    pub fn new(email: &str, password_hash: impl Into<String>, role: Role, active: bool) -> Self {
        let email = email.trim().to_string();
        Credential {
            id: normalize_email(&email),
            email,
            password_hash: password_hash.into(),
            role,
            active,
        }
    }
}

/// Lookup-key normalization shared by credential storage and login.
#[inline]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Reporting Types
// =============================================================================

/// One low-stock entry on the dashboard shortlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockProduct {
    pub id: String,
    pub name: String,
    pub stock: i64,
}

impl From<&Product> for LowStockProduct {
    fn from(product: &Product) -> Self {
        LowStockProduct {
            id: product.id.clone(),
            name: product.name.clone(),
            stock: product.stock,
        }
    }
}

/// Catalog-wide aggregates for the dashboard view.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub total_products: usize,
    /// Products with `stock < threshold`.
    pub low_stock_count: usize,
    /// `Σ(price × stock)` rounded to 2 decimals.
    pub inventory_value: f64,
    /// The 5 lowest-stock products under the threshold, ascending.
    pub top_low_stock: Vec<LowStockProduct>,
}

// =============================================================================
// Unit Tests
// =============================================================================
