// Payment ledger orchestration.
//
// Validates input, delegates the atomic lock-validate-write-recompute cycle
// to the repository, and invalidates the tenant's analytics cache as soon as
// the write commits.

use std::sync::Arc;

use tracing::info;

use crate::core::{money, Result};
use crate::modules::analytics::cache::AnalyticsCache;
use crate::modules::analytics::models::EntityKind;
use crate::modules::payments::models::{LedgerPolicy, LedgerState, NewPayment, Payment};
use crate::modules::payments::repositories::PaymentRepository;

pub struct PaymentLedger {
    payments: Arc<dyn PaymentRepository>,
    cache: Arc<AnalyticsCache>,
    policy: LedgerPolicy,
}

impl PaymentLedger {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        cache: Arc<AnalyticsCache>,
        policy: LedgerPolicy,
    ) -> Self {
        Self {
            payments,
            cache,
            policy,
        }
    }

    /// Record a payment and return the recomputed ledger state.
    ///
    /// # Errors
    /// * `Validation` - non-positive amount, or the document is not an invoice
    /// * `Overpayment` - the payment would exceed the invoice total; ledger
    ///   state is unchanged
    /// * `NotFound` - unknown invoice
    pub async fn record_payment(
        &self,
        tenant_id: i64,
        invoice_id: &str,
        payment: NewPayment,
    ) -> Result<LedgerState> {
        money::require_positive("amount", payment.amount)?;

        let state = self
            .payments
            .record(tenant_id, invoice_id, &payment, self.policy)
            .await?;

        info!(
            tenant_id,
            invoice_id,
            amount = %payment.amount,
            status = %state.status,
            remaining = %state.remaining_balance,
            "payment recorded"
        );
        self.cache.invalidate(tenant_id, EntityKind::Payment);

        Ok(state)
    }

    /// Delete a payment and return the recomputed ledger state.
    pub async fn delete_payment(&self, tenant_id: i64, payment_id: &str) -> Result<LedgerState> {
        let state = self.payments.remove(tenant_id, payment_id, self.policy).await?;

        info!(
            tenant_id,
            payment_id,
            status = %state.status,
            remaining = %state.remaining_balance,
            "payment deleted"
        );
        self.cache.invalidate(tenant_id, EntityKind::Payment);

        Ok(state)
    }

    pub async fn list_payments(&self, tenant_id: i64, invoice_id: &str) -> Result<Vec<Payment>> {
        self.payments.find_for_invoice(tenant_id, invoice_id).await
    }
}
