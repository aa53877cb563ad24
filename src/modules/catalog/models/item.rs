use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tenant's priced catalog entry ("Poste" on printed documents).
///
/// Referenced, never mutated, by document lines: the line calculator copies
/// the fields it needs at line-creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub tenant_id: i64,
    pub code: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Unit of measure (M², ML, ...)
    pub unit: String,
    pub unit_price: Decimal,
    /// Percentage in [0, 100]
    pub tax_rate: Decimal,
    pub created_at: DateTime<Utc>,
}
