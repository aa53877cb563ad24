//! Tenant catalog items referenced by document lines.

pub mod models;
pub mod repositories;

pub use models::CatalogItem;
