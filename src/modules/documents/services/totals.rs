// Document totals aggregation.
//
// Both paths recompute everything from scratch on every call, so re-running
// after any line mutation is always correct and idempotent.
//
// The statutory path implements the retention rule for official Moroccan
// contractor invoices: a fixed 10% holdback ("réception provisoire") and a
// fixed 20% TVA on the retained base, applied regardless of the caller's
// discount and the lines' tax rates.

use rust_decimal::Decimal;

use crate::core::money::{self, round_amount};
use crate::core::Result;
use crate::modules::documents::models::{DocumentLine, DocumentTotals};

/// Fixed retention discount on official renderings, percent
pub const STATUTORY_RETENTION_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Fixed tax rate on official renderings, percent
pub const STATUTORY_TAX_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

pub struct DocumentTotalsAggregator;

impl DocumentTotalsAggregator {
    /// Roll up lines with a caller-supplied document discount.
    ///
    /// Each line's tax rate applies to that line's discounted share, so the
    /// tax total is the per-line tax sum scaled by (1 − discount/100); with a
    /// uniform line rate r this equals total_ht × r / 100.
    pub fn aggregate(lines: &[DocumentLine], discount_percentage: Decimal) -> Result<DocumentTotals> {
        money::require_rate("discount_percentage", discount_percentage)?;

        let subtotal: Decimal = lines.iter().map(|l| l.subtotal).sum();
        let line_tax: Decimal = lines.iter().map(|l| l.tax_amount).sum();

        let discount_amount = round_amount(subtotal * discount_percentage / Decimal::ONE_HUNDRED);
        let total_ht = round_amount(subtotal - discount_amount);
        let tax_amount = round_amount(
            line_tax * (Decimal::ONE - discount_percentage / Decimal::ONE_HUNDRED),
        );
        let total_ttc = round_amount(total_ht + tax_amount);

        Ok(DocumentTotals {
            subtotal: round_amount(subtotal),
            discount_percentage,
            discount_amount,
            total_ht,
            tax_amount,
            total_ttc,
        })
    }

    /// The named official-document computation path.
    ///
    /// Not a fallback: callers select it explicitly so user-entered discount
    /// and tax rates are never silently overridden.
    pub fn statutory_retention(lines: &[DocumentLine]) -> DocumentTotals {
        let subtotal: Decimal = lines.iter().map(|l| l.subtotal).sum();

        let discount_amount =
            round_amount(subtotal * STATUTORY_RETENTION_RATE / Decimal::ONE_HUNDRED);
        let total_ht = round_amount(subtotal - discount_amount);
        let tax_amount = round_amount(total_ht * STATUTORY_TAX_RATE / Decimal::ONE_HUNDRED);
        let total_ttc = round_amount(total_ht + tax_amount);

        DocumentTotals {
            subtotal: round_amount(subtotal),
            discount_percentage: STATUTORY_RETENTION_RATE,
            discount_amount,
            total_ht,
            tax_amount,
            total_ttc,
        }
    }
}
