// Pure payment-ledger state machine.
//
// Status derivation and the overpayment guard are pure functions of stored
// fields: total over the documented state space, no I/O, no clock. The
// repository runs them inside the row-locked transaction; tests run them
// directly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{EngineError, Result};
use crate::modules::documents::models::DocumentStatus;

/// Resolution of the open question on refund-to-zero regressions:
/// by default only documents that already left DRAFT regress to COMPLETED.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LedgerPolicy {
    /// Allow the ledger to advance a DRAFT invoice to COMPLETED when its
    /// payments are deleted back to zero
    pub complete_draft_on_refund: bool,
}

/// Reconciled view of an invoice after a ledger recomputation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub invoice_id: String,
    pub total_ttc: Decimal,
    pub paid_total: Decimal,
    pub remaining_balance: Decimal,
    pub status: DocumentStatus,
}

/// Reject a payment that would push the ledger past the invoice total.
///
/// Must run before the write, under the same lock that serializes the
/// invoice's payments; the ledger never observes payments exceeding the
/// total.
pub fn check_overpayment(
    total_ttc: Decimal,
    already_paid: Decimal,
    amount: Decimal,
) -> Result<()> {
    if already_paid + amount > total_ttc {
        return Err(EngineError::Overpayment {
            amount,
            already_paid,
            total_ttc,
        });
    }
    Ok(())
}

/// Derive `(remaining_balance, status)` from the persisted totals.
///
/// The `max(.., 0)` clamp is the single tolerated guard; payments exceeding
/// the total are rejected before they are ever written.
pub fn derive(
    invoice_id: String,
    total_ttc: Decimal,
    paid_total: Decimal,
    previous: DocumentStatus,
    policy: LedgerPolicy,
) -> LedgerState {
    let remaining_balance = (total_ttc - paid_total).max(Decimal::ZERO);

    let status = if remaining_balance.is_zero() {
        DocumentStatus::Paid
    } else if remaining_balance < total_ttc {
        DocumentStatus::PartiallyPaid
    } else {
        // no effective payments: regress, but never force-advance a draft
        match previous {
            DocumentStatus::Paid | DocumentStatus::PartiallyPaid => DocumentStatus::Completed,
            DocumentStatus::Draft if policy.complete_draft_on_refund => DocumentStatus::Completed,
            other => other,
        }
    };

    LedgerState {
        invoice_id,
        total_ttc,
        paid_total,
        remaining_balance,
        status,
    }
}
