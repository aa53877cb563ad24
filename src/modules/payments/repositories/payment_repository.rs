// Payment persistence and transactional ledger recomputation.
//
// Both mutations lock the invoice row (SELECT ... FOR UPDATE) before
// touching payments, so concurrent writes against one invoice serialize
// their read-modify-write of (remaining_balance, status). The overpayment
// invariant is re-validated under that lock, and the derived ledger state
// is persisted in the same transaction as the payment write.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, Row, Transaction};
use std::str::FromStr;
use uuid::Uuid;

use crate::core::{EngineError, Result};
use crate::modules::documents::models::{DocumentKind, DocumentStatus};
use crate::modules::payments::models::{
    ledger, LedgerPolicy, LedgerState, NewPayment, Payment, PaymentMethod,
};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Atomically record a payment against an invoice and persist the
    /// recomputed ledger state.
    ///
    /// # Errors
    /// * `NotFound` - no such invoice for the tenant
    /// * `Validation` - the document is not an invoice
    /// * `Overpayment` - the invariant check failed; nothing is written
    async fn record(
        &self,
        tenant_id: i64,
        invoice_id: &str,
        payment: &NewPayment,
        policy: LedgerPolicy,
    ) -> Result<LedgerState>;

    /// Atomically delete a payment and persist the recomputed ledger state
    async fn remove(
        &self,
        tenant_id: i64,
        payment_id: &str,
        policy: LedgerPolicy,
    ) -> Result<LedgerState>;

    async fn find_for_invoice(&self, tenant_id: i64, invoice_id: &str) -> Result<Vec<Payment>>;
}

pub struct MySqlPaymentRepository {
    pool: MySqlPool,
}

struct LockedInvoice {
    id: String,
    total_ttc: Decimal,
    status: DocumentStatus,
}

impl MySqlPaymentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Lock the invoice row for the rest of the transaction
    async fn lock_invoice(
        tx: &mut Transaction<'_, MySql>,
        tenant_id: i64,
        invoice_id: &str,
    ) -> Result<LockedInvoice> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, status, total_ttc
            FROM documents
            WHERE tenant_id = ? AND id = ?
            FOR UPDATE
            "#,
        )
        .bind(tenant_id)
        .bind(invoice_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| EngineError::not_found(format!("Invoice '{}' not found", invoice_id)))?;

        let kind: String = row.try_get("kind")?;
        if DocumentKind::from_str(&kind)
            .map_err(|e| EngineError::internal(format!("Invalid kind in database: {}", e)))?
            != DocumentKind::Invoice
        {
            return Err(EngineError::validation(format!(
                "invoice_id: document '{}' is a {}, payments apply to invoices only",
                invoice_id, kind
            )));
        }

        let status: String = row.try_get("status")?;
        Ok(LockedInvoice {
            id: row.try_get("id")?,
            total_ttc: row.try_get("total_ttc")?,
            status: DocumentStatus::from_str(&status)
                .map_err(|e| EngineError::internal(format!("Invalid status in database: {}", e)))?,
        })
    }

    /// Sum of active payments, read inside the locked transaction
    async fn paid_total(tx: &mut Transaction<'_, MySql>, invoice_id: &str) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM payments
            WHERE invoice_id = ?
            "#,
        )
        .bind(invoice_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(total)
    }

    async fn persist_state(
        tx: &mut Transaction<'_, MySql>,
        tenant_id: i64,
        state: &LedgerState,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE documents
            SET remaining_balance = ?, status = ?, updated_at = ?
            WHERE tenant_id = ? AND id = ?
            "#,
        )
        .bind(state.remaining_balance)
        .bind(state.status.as_str())
        .bind(Utc::now())
        .bind(tenant_id)
        .bind(&state.invoice_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for MySqlPaymentRepository {
    async fn record(
        &self,
        tenant_id: i64,
        invoice_id: &str,
        payment: &NewPayment,
        policy: LedgerPolicy,
    ) -> Result<LedgerState> {
        let mut tx = self.pool.begin().await?;

        let invoice = Self::lock_invoice(&mut tx, tenant_id, invoice_id).await?;
        let already_paid = Self::paid_total(&mut tx, &invoice.id).await?;

        ledger::check_overpayment(invoice.total_ttc, already_paid, payment.amount)?;

        sqlx::query(
            r#"
            INSERT INTO payments (id, invoice_id, amount, method, payment_date, reference, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&invoice.id)
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .bind(payment.payment_date)
        .bind(&payment.reference)
        .bind(&payment.notes)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let state = ledger::derive(
            invoice.id.clone(),
            invoice.total_ttc,
            already_paid + payment.amount,
            invoice.status,
            policy,
        );
        Self::persist_state(&mut tx, tenant_id, &state).await?;

        tx.commit().await?;
        Ok(state)
    }

    async fn remove(
        &self,
        tenant_id: i64,
        payment_id: &str,
        policy: LedgerPolicy,
    ) -> Result<LedgerState> {
        let mut tx = self.pool.begin().await?;

        // resolve the owning invoice first, then take its lock
        let invoice_id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT p.invoice_id
            FROM payments p
            JOIN documents d ON d.id = p.invoice_id
            WHERE p.id = ? AND d.tenant_id = ?
            "#,
        )
        .bind(payment_id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?;

        let invoice_id = invoice_id
            .ok_or_else(|| EngineError::not_found(format!("Payment '{}' not found", payment_id)))?;

        let invoice = Self::lock_invoice(&mut tx, tenant_id, &invoice_id).await?;

        let deleted = sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(payment_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            // lost a race with another deleter after the lookup
            return Err(EngineError::not_found(format!(
                "Payment '{}' not found",
                payment_id
            )));
        }

        let paid_total = Self::paid_total(&mut tx, &invoice.id).await?;
        let state = ledger::derive(
            invoice.id.clone(),
            invoice.total_ttc,
            paid_total,
            invoice.status,
            policy,
        );
        Self::persist_state(&mut tx, tenant_id, &state).await?;

        tx.commit().await?;
        Ok(state)
    }

    async fn find_for_invoice(&self, tenant_id: i64, invoice_id: &str) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.invoice_id, p.amount, p.method, p.payment_date, p.reference,
                   p.notes, p.created_at
            FROM payments p
            JOIN documents d ON d.id = p.invoice_id
            WHERE d.tenant_id = ? AND p.invoice_id = ?
            ORDER BY p.created_at
            "#,
        )
        .bind(tenant_id)
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let method: String = row.try_get("method")?;
                Ok(Payment {
                    id: row.try_get("id")?,
                    invoice_id: row.try_get("invoice_id")?,
                    amount: row.try_get("amount")?,
                    method: PaymentMethod::from_str(&method).map_err(|e| {
                        EngineError::internal(format!("Invalid method in database: {}", e))
                    })?,
                    payment_date: row.try_get("payment_date")?,
                    reference: row.try_get("reference")?,
                    notes: row.try_get("notes")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}
