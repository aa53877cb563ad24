use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate amounts of a financial document.
///
/// Always produced as a whole by the totals aggregator; individual fields
/// are never hand-edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub discount_percentage: Decimal,
    pub discount_amount: Decimal,
    /// Taxable base after discount ("hors taxes")
    pub total_ht: Decimal,
    pub tax_amount: Decimal,
    /// Grand total ("toutes taxes comprises")
    pub total_ttc: Decimal,
}
