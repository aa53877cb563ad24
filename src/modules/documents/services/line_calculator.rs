// Line item calculator.
//
// Normalizes one raw line into a persisted DocumentLine: snapshots the
// referenced catalog item (immutability-by-copy), validates the numeric
// inputs, and derives subtotal / tax / total. Rounding happens once per
// derived field, at the end.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::money::{self, round_amount};
use crate::core::{EngineError, Result};
use crate::modules::catalog::models::CatalogItem;
use crate::modules::documents::models::{DocumentLine, LineInput};

pub struct LineItemCalculator;

impl LineItemCalculator {
    /// Build a document line from raw input and an optional catalog snapshot.
    ///
    /// Caller-supplied fields always win over the catalog item's; missing
    /// display and pricing fields are copied from the item so later catalog
    /// edits cannot change this document.
    ///
    /// # Errors
    /// `Validation` naming the offending field when quantity or unit_price is
    /// negative, tax_rate is outside [0, 100], or no name/price can be
    /// resolved. No silent clamping.
    pub fn build_line(
        input: &LineInput,
        catalog_item: Option<&CatalogItem>,
        position: i32,
    ) -> Result<DocumentLine> {
        let item_name = input
            .item_name
            .clone()
            .or_else(|| catalog_item.map(|i| i.name.clone()))
            .unwrap_or_default();
        if item_name.trim().is_empty() {
            return Err(EngineError::validation(
                "item_name is required when no catalog item is referenced",
            ));
        }

        let item_code = input
            .item_code
            .clone()
            .or_else(|| catalog_item.and_then(|i| i.code.clone()));
        let item_description = input
            .item_description
            .clone()
            .or_else(|| catalog_item.and_then(|i| i.description.clone()));
        let unit = input
            .unit
            .clone()
            .or_else(|| catalog_item.map(|i| i.unit.clone()))
            .unwrap_or_default();

        let unit_price = match input.unit_price.or_else(|| catalog_item.map(|i| i.unit_price)) {
            Some(p) => p,
            None => {
                return Err(EngineError::validation(
                    "unit_price is required when no catalog item is referenced",
                ))
            }
        };
        let tax_rate = input
            .tax_rate
            .or_else(|| catalog_item.map(|i| i.tax_rate))
            .unwrap_or(Decimal::ZERO);

        money::require_non_negative("quantity", input.quantity)?;
        money::require_non_negative("unit_price", unit_price)?;
        money::require_rate("tax_rate", tax_rate)?;

        let subtotal = round_amount(input.quantity * unit_price);
        let tax_amount = round_amount(subtotal * tax_rate / Decimal::ONE_HUNDRED);
        let total = round_amount(subtotal + tax_amount);

        Ok(DocumentLine {
            id: Uuid::new_v4().to_string(),
            document_id: String::new(), // bound when the document is persisted
            item_id: input.item_id.clone(),
            item_code,
            item_name,
            item_description,
            unit,
            quantity: input.quantity,
            unit_price,
            tax_rate,
            subtotal,
            tax_amount,
            total,
            position,
        })
    }
}
