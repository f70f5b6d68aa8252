//! # Services
//!
//! Business operations behind the HTTP handlers. Each service owns the
//! repositories it needs, runs field validation first, and translates
//! repository errors into [`ApiError`](crate::error::ApiError) at this
//! boundary so handlers stay thin.

pub mod catalog;
pub mod report;
pub mod sale;

pub use catalog::CatalogService;
pub use report::ReportService;
pub use sale::SaleService;
