use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use facturier::core::{EngineError, Result};
use facturier::modules::analytics::models::{
    ClientRevenue, ExpenseCategoryTotal, LaborIntensity, MonthlyRevenue, OpenInvoice,
    SiteLaborRow, SiteLedgerRow,
};
use facturier::modules::analytics::repositories::AnalyticsRepository;
use facturier::modules::catalog::models::CatalogItem;
use facturier::modules::catalog::repositories::CatalogItemRepository;
use facturier::modules::documents::models::{
    DocumentKind, DocumentLine, DocumentStatus, FinancialDocument,
};
use facturier::modules::documents::repositories::DocumentRepository;
use facturier::modules::documents::services::PeriodKey;
use facturier::modules::payments::models::{
    ledger, LedgerPolicy, LedgerState, NewPayment, Payment, PaymentMethod,
};
use facturier::modules::payments::repositories::PaymentRepository;

#[derive(Default)]
struct State {
    catalog: HashMap<String, CatalogItem>,
    documents: HashMap<String, FinancialDocument>,
    lines: HashMap<String, Vec<DocumentLine>>,
    payments: HashMap<String, Payment>,
}

/// In-memory store implementing every repository trait the engine needs
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    /// Times the KPI aggregate was recomputed (cache-miss counter)
    pub kpi_computations: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_catalog_item(&self, item: CatalogItem) {
        let mut state = self.state.lock().unwrap();
        state.catalog.insert(item.id.clone(), item);
    }

    pub fn document(&self, id: &str) -> Option<FinancialDocument> {
        self.state.lock().unwrap().documents.get(id).cloned()
    }

    pub fn payment_ids(&self, invoice_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut ids: Vec<String> = state
            .payments
            .values()
            .filter(|p| p.invoice_id == invoice_id)
            .map(|p| p.id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn kpi_computation_count(&self) -> u32 {
        self.kpi_computations.load(Ordering::SeqCst)
    }

    fn paid_total_locked(state: &State, invoice_id: &str) -> Decimal {
        state
            .payments
            .values()
            .filter(|p| p.invoice_id == invoice_id)
            .map(|p| p.amount)
            .sum()
    }
}

#[async_trait]
impl CatalogItemRepository for MemoryStore {
    async fn find_by_id(&self, tenant_id: i64, id: &str) -> Result<Option<CatalogItem>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .catalog
            .get(id)
            .filter(|item| item.tenant_id == tenant_id)
            .cloned())
    }
}

#[async_trait]
impl DocumentRepository for MemoryStore {
    async fn highest_sequence(
        &self,
        tenant_id: i64,
        kind: DocumentKind,
        period: &PeriodKey,
    ) -> Result<u32> {
        let state = self.state.lock().unwrap();
        Ok(state
            .documents
            .values()
            .filter(|d| d.tenant_id == tenant_id && d.kind == kind)
            .filter_map(|d| period.sequence_of(&d.document_number))
            .max()
            .unwrap_or(0))
    }

    async fn insert_with_lines(
        &self,
        document: &FinancialDocument,
        lines: &[DocumentLine],
    ) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let taken = state.documents.values().any(|d| {
            d.tenant_id == document.tenant_id
                && d.kind == document.kind
                && d.document_number == document.document_number
        });
        if taken {
            return Ok(false);
        }

        state.documents.insert(document.id.clone(), document.clone());
        state.lines.insert(document.id.clone(), lines.to_vec());
        Ok(true)
    }

    async fn find_by_id(&self, tenant_id: i64, id: &str) -> Result<Option<FinancialDocument>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .documents
            .get(id)
            .filter(|d| d.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_lines(&self, document_id: &str) -> Result<Vec<DocumentLine>> {
        let state = self.state.lock().unwrap();
        Ok(state.lines.get(document_id).cloned().unwrap_or_default())
    }

    async fn update_status(&self, tenant_id: i64, id: &str, status: DocumentStatus) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let document = state
            .documents
            .get_mut(id)
            .filter(|d| d.tenant_id == tenant_id)
            .ok_or_else(|| EngineError::not_found(format!("Document '{}' not found", id)))?;
        document.status = status;
        document.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn record(
        &self,
        tenant_id: i64,
        invoice_id: &str,
        payment: &NewPayment,
        policy: LedgerPolicy,
    ) -> Result<LedgerState> {
        let mut state = self.state.lock().unwrap();

        let (total_ttc, status, kind) = {
            let invoice = state
                .documents
                .get(invoice_id)
                .filter(|d| d.tenant_id == tenant_id)
                .ok_or_else(|| {
                    EngineError::not_found(format!("Invoice '{}' not found", invoice_id))
                })?;
            (invoice.total_ttc, invoice.status, invoice.kind)
        };
        if kind != DocumentKind::Invoice {
            return Err(EngineError::validation(
                "invoice_id: payments apply to invoices only",
            ));
        }

        let already_paid = Self::paid_total_locked(&state, invoice_id);
        ledger::check_overpayment(total_ttc, already_paid, payment.amount)?;

        let record = Payment {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            amount: payment.amount,
            method: payment.method,
            payment_date: payment.payment_date,
            reference: payment.reference.clone(),
            notes: payment.notes.clone(),
            created_at: Utc::now(),
        };
        state.payments.insert(record.id.clone(), record);

        let ledger_state = ledger::derive(
            invoice_id.to_string(),
            total_ttc,
            already_paid + payment.amount,
            status,
            policy,
        );
        let invoice = state.documents.get_mut(invoice_id).unwrap();
        invoice.remaining_balance = ledger_state.remaining_balance;
        invoice.status = ledger_state.status;
        Ok(ledger_state)
    }

    async fn remove(
        &self,
        tenant_id: i64,
        payment_id: &str,
        policy: LedgerPolicy,
    ) -> Result<LedgerState> {
        let mut state = self.state.lock().unwrap();

        let invoice_id = state
            .payments
            .get(payment_id)
            .map(|p| p.invoice_id.clone())
            .ok_or_else(|| EngineError::not_found(format!("Payment '{}' not found", payment_id)))?;

        let (total_ttc, status) = {
            let invoice = state
                .documents
                .get(&invoice_id)
                .filter(|d| d.tenant_id == tenant_id)
                .ok_or_else(|| {
                    EngineError::not_found(format!("Payment '{}' not found", payment_id))
                })?;
            (invoice.total_ttc, invoice.status)
        };

        state.payments.remove(payment_id);
        let paid_total = Self::paid_total_locked(&state, &invoice_id);

        let ledger_state = ledger::derive(invoice_id.clone(), total_ttc, paid_total, status, policy);
        let invoice = state.documents.get_mut(&invoice_id).unwrap();
        invoice.remaining_balance = ledger_state.remaining_balance;
        invoice.status = ledger_state.status;
        Ok(ledger_state)
    }

    async fn find_for_invoice(&self, tenant_id: i64, invoice_id: &str) -> Result<Vec<Payment>> {
        let state = self.state.lock().unwrap();
        if state
            .documents
            .get(invoice_id)
            .filter(|d| d.tenant_id == tenant_id)
            .is_none()
        {
            return Ok(vec![]);
        }
        let mut payments: Vec<Payment> = state
            .payments
            .values()
            .filter(|p| p.invoice_id == invoice_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(payments)
    }
}

const REVENUE_STATUSES: [DocumentStatus; 3] = [
    DocumentStatus::Completed,
    DocumentStatus::PartiallyPaid,
    DocumentStatus::Paid,
];

#[async_trait]
impl AnalyticsRepository for MemoryStore {
    async fn invoice_revenue_and_count(&self, tenant_id: i64) -> Result<(Decimal, i64)> {
        self.kpi_computations.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let invoices: Vec<&FinancialDocument> = state
            .documents
            .values()
            .filter(|d| {
                d.tenant_id == tenant_id
                    && d.kind == DocumentKind::Invoice
                    && REVENUE_STATUSES.contains(&d.status)
            })
            .collect();
        let revenue = invoices.iter().map(|d| d.total_ttc).sum();
        Ok((revenue, invoices.len() as i64))
    }

    async fn collected_total(&self, tenant_id: i64) -> Result<Decimal> {
        let state = self.state.lock().unwrap();
        Ok(state
            .payments
            .values()
            .filter(|p| {
                state
                    .documents
                    .get(&p.invoice_id)
                    .is_some_and(|d| d.tenant_id == tenant_id)
            })
            .map(|p| p.amount)
            .sum())
    }

    async fn expenses_total(&self, _tenant_id: i64) -> Result<Decimal> {
        Ok(Decimal::ZERO)
    }

    async fn revenue_by_month(&self, tenant_id: i64) -> Result<Vec<MonthlyRevenue>> {
        let state = self.state.lock().unwrap();
        let mut by_month: HashMap<String, Decimal> = HashMap::new();
        for d in state.documents.values().filter(|d| {
            d.tenant_id == tenant_id
                && d.kind == DocumentKind::Invoice
                && REVENUE_STATUSES.contains(&d.status)
        }) {
            *by_month
                .entry(d.issued_date.format("%Y-%m").to_string())
                .or_default() += d.total_ttc;
        }
        let mut rows: Vec<MonthlyRevenue> = by_month
            .into_iter()
            .map(|(month, revenue)| MonthlyRevenue { month, revenue })
            .collect();
        rows.sort_by(|a, b| a.month.cmp(&b.month));
        Ok(rows)
    }

    async fn expense_breakdown(&self, _tenant_id: i64) -> Result<Vec<ExpenseCategoryTotal>> {
        Ok(vec![])
    }

    async fn site_financials(&self, _tenant_id: i64) -> Result<Vec<SiteLedgerRow>> {
        Ok(vec![])
    }

    async fn open_invoices(&self, tenant_id: i64) -> Result<Vec<OpenInvoice>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .documents
            .values()
            .filter(|d| {
                d.tenant_id == tenant_id
                    && d.kind == DocumentKind::Invoice
                    && matches!(
                        d.status,
                        DocumentStatus::Completed | DocumentStatus::PartiallyPaid
                    )
            })
            .map(|d| OpenInvoice {
                total_ttc: d.total_ttc,
                remaining_balance: d.remaining_balance,
                due_date: d.due_date,
            })
            .collect())
    }

    async fn invoice_sales_since(&self, tenant_id: i64, from: NaiveDate) -> Result<Decimal> {
        let state = self.state.lock().unwrap();
        Ok(state
            .documents
            .values()
            .filter(|d| {
                d.tenant_id == tenant_id
                    && d.kind == DocumentKind::Invoice
                    && d.issued_date >= from
            })
            .map(|d| d.total_ttc)
            .sum())
    }

    async fn top_clients(&self, _tenant_id: i64, _limit: i64) -> Result<Vec<ClientRevenue>> {
        Ok(vec![])
    }

    async fn labor_totals(&self, _tenant_id: i64) -> Result<LaborIntensity> {
        Ok(LaborIntensity::default())
    }

    async fn site_labor(&self, _tenant_id: i64) -> Result<Vec<SiteLaborRow>> {
        Ok(vec![])
    }

    async fn collected_tax_between(
        &self,
        tenant_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal> {
        let state = self.state.lock().unwrap();
        Ok(state
            .documents
            .values()
            .filter(|d| {
                d.tenant_id == tenant_id
                    && d.kind == DocumentKind::Invoice
                    && d.status == DocumentStatus::Paid
                    && d.issued_date >= from
                    && d.issued_date < to
            })
            .map(|d| d.tax_amount)
            .sum())
    }

    async fn expenses_between(
        &self,
        _tenant_id: i64,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Decimal> {
        Ok(Decimal::ZERO)
    }
}

/// Convenience constructor for payment inputs
pub fn cash_payment(amount: Decimal, date: &str) -> NewPayment {
    NewPayment {
        amount,
        method: PaymentMethod::Cash,
        payment_date: date.parse().unwrap(),
        reference: None,
        notes: None,
    }
}
