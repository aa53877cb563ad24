// Aggregation queries behind the analytics read-model.
//
// The relational store is the source of truth; these queries run on every
// cache miss. Revenue aggregates count invoices in COMPLETED,
// PARTIALLY_PAID or PAID; per-site rollups mirror the ledger without a
// status filter, matching the operational reports they feed.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{MySqlPool, Row};

use crate::core::Result;
use crate::modules::analytics::models::{
    ClientRevenue, ExpenseCategoryTotal, LaborIntensity, MonthlyRevenue, OpenInvoice,
    SiteLaborRow, SiteLedgerRow,
};

const REVENUE_STATUSES: &str = "'COMPLETED', 'PARTIALLY_PAID', 'PAID'";

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// (Σ total_ttc, count) over revenue-bearing invoices
    async fn invoice_revenue_and_count(&self, tenant_id: i64) -> Result<(Decimal, i64)>;

    /// Σ payment amounts across the tenant's invoices
    async fn collected_total(&self, tenant_id: i64) -> Result<Decimal>;

    async fn expenses_total(&self, tenant_id: i64) -> Result<Decimal>;

    async fn revenue_by_month(&self, tenant_id: i64) -> Result<Vec<MonthlyRevenue>>;

    async fn expense_breakdown(&self, tenant_id: i64) -> Result<Vec<ExpenseCategoryTotal>>;

    async fn site_financials(&self, tenant_id: i64) -> Result<Vec<SiteLedgerRow>>;

    /// Unpaid invoices (COMPLETED or PARTIALLY_PAID) with their balances
    async fn open_invoices(&self, tenant_id: i64) -> Result<Vec<OpenInvoice>>;

    /// Σ total_ttc of invoices issued on or after `from`
    async fn invoice_sales_since(&self, tenant_id: i64, from: NaiveDate) -> Result<Decimal>;

    async fn top_clients(&self, tenant_id: i64, limit: i64) -> Result<Vec<ClientRevenue>>;

    async fn labor_totals(&self, tenant_id: i64) -> Result<LaborIntensity>;

    async fn site_labor(&self, tenant_id: i64) -> Result<Vec<SiteLaborRow>>;

    /// Σ tax_amount of PAID invoices issued in [from, to)
    async fn collected_tax_between(
        &self,
        tenant_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal>;

    /// Σ expense amounts dated in [from, to)
    async fn expenses_between(
        &self,
        tenant_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal>;
}

pub struct MySqlAnalyticsRepository {
    pool: MySqlPool,
}

impl MySqlAnalyticsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for MySqlAnalyticsRepository {
    async fn invoice_revenue_and_count(&self, tenant_id: i64) -> Result<(Decimal, i64)> {
        let row = sqlx::query(&format!(
            r#"
            SELECT COALESCE(SUM(total_ttc), 0) AS revenue, COUNT(*) AS invoice_count
            FROM documents
            WHERE tenant_id = ? AND kind = 'INVOICE' AND status IN ({})
            "#,
            REVENUE_STATUSES
        ))
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.try_get("revenue")?, row.try_get("invoice_count")?))
    }

    async fn collected_total(&self, tenant_id: i64) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(p.amount), 0)
            FROM payments p
            JOIN documents d ON d.id = p.invoice_id
            WHERE d.tenant_id = ?
            "#,
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn expenses_total(&self, tenant_id: i64) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM expenses
            WHERE tenant_id = ?
            "#,
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn revenue_by_month(&self, tenant_id: i64) -> Result<Vec<MonthlyRevenue>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT DATE_FORMAT(issued_date, '%Y-%m') AS month,
                   COALESCE(SUM(total_ttc), 0) AS revenue
            FROM documents
            WHERE tenant_id = ? AND kind = 'INVOICE' AND status IN ({})
            GROUP BY month
            ORDER BY month
            "#,
            REVENUE_STATUSES
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(MonthlyRevenue {
                    month: row.try_get("month")?,
                    revenue: row.try_get("revenue")?,
                })
            })
            .collect()
    }

    async fn expense_breakdown(&self, tenant_id: i64) -> Result<Vec<ExpenseCategoryTotal>> {
        let rows = sqlx::query(
            r#"
            SELECT category, COALESCE(SUM(amount), 0) AS total_amount
            FROM expenses
            WHERE tenant_id = ?
            GROUP BY category
            ORDER BY total_amount DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ExpenseCategoryTotal {
                    category: row.try_get("category")?,
                    total_amount: row.try_get("total_amount")?,
                })
            })
            .collect()
    }

    async fn site_financials(&self, tenant_id: i64) -> Result<Vec<SiteLedgerRow>> {
        let rows = sqlx::query(
            r#"
            SELECT s.name AS site_name,
                   COALESCE(inv.revenue, 0) AS revenue,
                   COALESCE(ex.expenses, 0) AS expenses
            FROM sites s
            LEFT JOIN (
                SELECT site_id, SUM(total_ttc) AS revenue
                FROM documents
                WHERE tenant_id = ? AND kind = 'INVOICE'
                GROUP BY site_id
            ) inv ON inv.site_id = s.id
            LEFT JOIN (
                SELECT site_id, SUM(amount) AS expenses
                FROM expenses
                WHERE tenant_id = ?
                GROUP BY site_id
            ) ex ON ex.site_id = s.id
            WHERE s.tenant_id = ?
            "#,
        )
        .bind(tenant_id)
        .bind(tenant_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(SiteLedgerRow {
                    site_name: row.try_get("site_name")?,
                    revenue: row.try_get("revenue")?,
                    expenses: row.try_get("expenses")?,
                })
            })
            .collect()
    }

    async fn open_invoices(&self, tenant_id: i64) -> Result<Vec<OpenInvoice>> {
        let rows = sqlx::query(
            r#"
            SELECT total_ttc, remaining_balance, due_date
            FROM documents
            WHERE tenant_id = ? AND kind = 'INVOICE'
              AND status IN ('COMPLETED', 'PARTIALLY_PAID')
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(OpenInvoice {
                    total_ttc: row.try_get("total_ttc")?,
                    remaining_balance: row.try_get("remaining_balance")?,
                    due_date: row.try_get("due_date")?,
                })
            })
            .collect()
    }

    async fn invoice_sales_since(&self, tenant_id: i64, from: NaiveDate) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_ttc), 0)
            FROM documents
            WHERE tenant_id = ? AND kind = 'INVOICE' AND issued_date >= ?
            "#,
        )
        .bind(tenant_id)
        .bind(from)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn top_clients(&self, tenant_id: i64, limit: i64) -> Result<Vec<ClientRevenue>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id AS client_id, c.company_name,
                   COALESCE(SUM(d.total_ttc), 0) AS total_invoiced
            FROM clients c
            LEFT JOIN documents d
                   ON d.client_id = c.id AND d.tenant_id = c.tenant_id AND d.kind = 'INVOICE'
            WHERE c.tenant_id = ?
            GROUP BY c.id, c.company_name
            ORDER BY total_invoiced DESC
            LIMIT ?
            "#,
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ClientRevenue {
                    client_id: row.try_get("client_id")?,
                    company_name: row.try_get("company_name")?,
                    total_invoiced: row.try_get("total_invoiced")?,
                })
            })
            .collect()
    }

    async fn labor_totals(&self, tenant_id: i64) -> Result<LaborIntensity> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(hours_worked), 0) AS total_hours,
                   COALESCE(SUM(CASE WHEN present THEN 1 ELSE 0 END), 0) AS total_presences
            FROM attendance
            WHERE tenant_id = ?
            "#,
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(LaborIntensity {
            total_hours: row.try_get("total_hours")?,
            total_presences: row.try_get("total_presences")?,
        })
    }

    async fn site_labor(&self, tenant_id: i64) -> Result<Vec<SiteLaborRow>> {
        let rows = sqlx::query(
            r#"
            SELECT s.name AS site_name,
                   COALESCE(inv.revenue, 0) AS revenue,
                   COALESCE(att.hours, 0) AS hours
            FROM sites s
            LEFT JOIN (
                SELECT site_id, SUM(total_ttc) AS revenue
                FROM documents
                WHERE tenant_id = ? AND kind = 'INVOICE'
                GROUP BY site_id
            ) inv ON inv.site_id = s.id
            LEFT JOIN (
                SELECT site_id, SUM(hours_worked) AS hours
                FROM attendance
                WHERE tenant_id = ?
                GROUP BY site_id
            ) att ON att.site_id = s.id
            WHERE s.tenant_id = ?
            "#,
        )
        .bind(tenant_id)
        .bind(tenant_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(SiteLaborRow {
                    site_name: row.try_get("site_name")?,
                    revenue: row.try_get("revenue")?,
                    hours: row.try_get("hours")?,
                })
            })
            .collect()
    }

    async fn collected_tax_between(
        &self,
        tenant_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(tax_amount), 0)
            FROM documents
            WHERE tenant_id = ? AND kind = 'INVOICE' AND status = 'PAID'
              AND issued_date >= ? AND issued_date < ?
            "#,
        )
        .bind(tenant_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn expenses_between(
        &self,
        tenant_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM expenses
            WHERE tenant_id = ? AND expense_date >= ? AND expense_date < ?
            "#,
        )
        .bind(tenant_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
