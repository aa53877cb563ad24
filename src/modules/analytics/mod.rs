//! Per-tenant cached analytics read-model.
//!
//! Ten fixed aggregates recomputed from the ledger on cache misses and
//! evicted, whole-tenant, on every source-entity mutation.

pub mod cache;
pub mod models;
pub mod repositories;
pub mod services;

pub use cache::AnalyticsCache;
pub use models::{EntityKind, Metric};
pub use services::AnalyticsService;
