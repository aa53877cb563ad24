// Document line with catalog snapshot fields.
//
// A line snapshots the catalog item it references at creation time so that
// later catalog edits cannot retroactively change a historical document.
// The resolved fields (subtotal, tax_amount, total) are always derived from
// quantity / unit_price / tax_rate at write time, never edited on their own.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line of a financial document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLine {
    pub id: String,
    pub document_id: String,
    /// Catalog item the snapshot was taken from, if any
    pub item_id: Option<String>,

    pub item_code: Option<String>,
    pub item_name: String,
    pub item_description: Option<String>,
    /// Unit of measure shown on the document (M², ML, ...)
    pub unit: String,

    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Percentage in [0, 100]
    pub tax_rate: Decimal,

    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,

    /// Display order; irrelevant to totals
    pub position: i32,
}

/// Caller-supplied raw line data, before snapshot and derivation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineInput {
    pub item_id: Option<String>,
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub item_description: Option<String>,
    pub unit: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
}
