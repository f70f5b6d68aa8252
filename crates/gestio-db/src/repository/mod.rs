//! # Repository Module
//!
//! One repository per aggregate. Each owns every SQL statement that touches
//! its tables, so handlers and services never see a query string.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  service layer                                                          │
//! │     │ db.products()                     │ db.sales()                    │
//! │     ▼                                   ▼                               │
//! │  ProductRepository                   SaleRepository                     │
//! │  list / get / find / below_stock     register (single transaction)      │
//! │  insert / update / delete / count    list_between / get / count         │
//! │     │                                   │                               │
//! │     └────────► one SqlitePool ◄─────────┘                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both hand back `gestio-core` types and report failures as
//! [`DbError`](crate::DbError); sale registration additionally surfaces
//! domain rejections through
//! [`RegisterSaleError`](sale::RegisterSaleError).

pub mod product;
pub mod sale;
