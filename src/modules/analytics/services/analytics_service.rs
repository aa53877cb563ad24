// Analytics read-model.
//
// Every metric is read through the per-tenant cache; a miss re-aggregates
// from the relational store. Date-sensitive metrics take an explicit
// `as_of` date so results are reproducible in tests and reports.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;

use crate::core::{EngineError, Result};
use crate::modules::analytics::cache::AnalyticsCache;
use crate::modules::analytics::models::{
    AgingBuckets, ClientRevenue, DsoReport, ExpenseCategoryTotal, KpiSummary, LaborIntensity,
    Metric, MonthlyRevenue, OpenInvoice, ProjectEfficiency, SiteProfitability, TaxForecast,
};
use crate::modules::analytics::repositories::AnalyticsRepository;

/// Estimated recoverable VAT share on expenses, percent
const RECOVERABLE_TAX_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

const DSO_WINDOW_DAYS: u64 = 90;
const TOP_CLIENT_COUNT: i64 = 5;

pub struct AnalyticsService {
    repository: Arc<dyn AnalyticsRepository>,
    cache: Arc<AnalyticsCache>,
}

impl AnalyticsService {
    pub fn new(repository: Arc<dyn AnalyticsRepository>, cache: Arc<AnalyticsCache>) -> Self {
        Self { repository, cache }
    }

    /// Dispatch a metric by its public name, returning the JSON the cache
    /// stores. Unknown names fail with `Validation`.
    pub async fn get(
        &self,
        tenant_id: i64,
        metric: &str,
        as_of: NaiveDate,
    ) -> Result<serde_json::Value> {
        let metric = Metric::from_str(metric)
            .map_err(|e| EngineError::validation(format!("metric: {}", e)))?;

        let to_json = |e| EngineError::internal(format!("Failed to serialize metric: {}", e));
        match metric {
            Metric::KpiSummary => {
                serde_json::to_value(self.kpi_summary(tenant_id).await?).map_err(to_json)
            }
            Metric::RevenueTrend => {
                serde_json::to_value(self.revenue_trend(tenant_id).await?).map_err(to_json)
            }
            Metric::ExpenseBreakdown => {
                serde_json::to_value(self.expense_breakdown(tenant_id).await?).map_err(to_json)
            }
            Metric::SiteProfitability => {
                serde_json::to_value(self.site_profitability(tenant_id).await?).map_err(to_json)
            }
            Metric::ArAging => {
                serde_json::to_value(self.ar_aging(tenant_id, as_of).await?).map_err(to_json)
            }
            Metric::Dso => serde_json::to_value(self.dso(tenant_id, as_of).await?).map_err(to_json),
            Metric::ClientConcentration => {
                serde_json::to_value(self.client_concentration(tenant_id).await?).map_err(to_json)
            }
            Metric::LaborIntensity => {
                serde_json::to_value(self.labor_intensity(tenant_id).await?).map_err(to_json)
            }
            Metric::ProjectEfficiency => {
                serde_json::to_value(self.project_efficiency(tenant_id).await?).map_err(to_json)
            }
            Metric::TaxForecast => {
                serde_json::to_value(self.tax_forecast(tenant_id, as_of).await?).map_err(to_json)
            }
        }
    }

    pub async fn kpi_summary(&self, tenant_id: i64) -> Result<KpiSummary> {
        let repository = self.repository.clone();
        self.cache
            .get_or_compute(tenant_id, Metric::KpiSummary, || async move {
                let (total_revenue, invoice_count) =
                    repository.invoice_revenue_and_count(tenant_id).await?;
                let total_collected = repository.collected_total(tenant_id).await?;
                let total_expenses = repository.expenses_total(tenant_id).await?;

                Ok(KpiSummary {
                    total_revenue,
                    total_collected,
                    outstanding_balance: total_revenue - total_collected,
                    total_expenses,
                    net_profit: total_revenue - total_expenses,
                    invoice_count,
                })
            })
            .await
    }

    pub async fn revenue_trend(&self, tenant_id: i64) -> Result<Vec<MonthlyRevenue>> {
        let repository = self.repository.clone();
        self.cache
            .get_or_compute(tenant_id, Metric::RevenueTrend, || async move {
                repository.revenue_by_month(tenant_id).await
            })
            .await
    }

    pub async fn expense_breakdown(&self, tenant_id: i64) -> Result<Vec<ExpenseCategoryTotal>> {
        let repository = self.repository.clone();
        self.cache
            .get_or_compute(tenant_id, Metric::ExpenseBreakdown, || async move {
                repository.expense_breakdown(tenant_id).await
            })
            .await
    }

    pub async fn site_profitability(&self, tenant_id: i64) -> Result<Vec<SiteProfitability>> {
        let repository = self.repository.clone();
        self.cache
            .get_or_compute(tenant_id, Metric::SiteProfitability, || async move {
                let mut sites: Vec<SiteProfitability> = repository
                    .site_financials(tenant_id)
                    .await?
                    .into_iter()
                    .map(|row| SiteProfitability {
                        margin: row.revenue - row.expenses,
                        site_name: row.site_name,
                        revenue: row.revenue,
                        expenses: row.expenses,
                    })
                    .collect();
                sites.sort_by(|a, b| b.margin.cmp(&a.margin));
                Ok(sites)
            })
            .await
    }

    pub async fn ar_aging(&self, tenant_id: i64, as_of: NaiveDate) -> Result<AgingBuckets> {
        let repository = self.repository.clone();
        self.cache
            .get_or_compute(tenant_id, Metric::ArAging, || async move {
                let open = repository.open_invoices(tenant_id).await?;
                Ok(bucket_aging(&open, as_of))
            })
            .await
    }

    pub async fn dso(&self, tenant_id: i64, as_of: NaiveDate) -> Result<DsoReport> {
        let repository = self.repository.clone();
        self.cache
            .get_or_compute(tenant_id, Metric::Dso, || async move {
                let open = repository.open_invoices(tenant_id).await?;
                let total_receivables: Decimal =
                    open.iter().map(|inv| inv.remaining_balance).sum();

                let window_start = as_of
                    .checked_sub_days(Days::new(DSO_WINDOW_DAYS))
                    .unwrap_or(as_of);
                let sales_90_days = repository
                    .invoice_sales_since(tenant_id, window_start)
                    .await?;

                Ok(compute_dso(total_receivables, sales_90_days))
            })
            .await
    }

    pub async fn client_concentration(&self, tenant_id: i64) -> Result<Vec<ClientRevenue>> {
        let repository = self.repository.clone();
        self.cache
            .get_or_compute(tenant_id, Metric::ClientConcentration, || async move {
                repository.top_clients(tenant_id, TOP_CLIENT_COUNT).await
            })
            .await
    }

    pub async fn labor_intensity(&self, tenant_id: i64) -> Result<LaborIntensity> {
        let repository = self.repository.clone();
        self.cache
            .get_or_compute(tenant_id, Metric::LaborIntensity, || async move {
                repository.labor_totals(tenant_id).await
            })
            .await
    }

    pub async fn project_efficiency(&self, tenant_id: i64) -> Result<Vec<ProjectEfficiency>> {
        let repository = self.repository.clone();
        self.cache
            .get_or_compute(tenant_id, Metric::ProjectEfficiency, || async move {
                let mut sites: Vec<ProjectEfficiency> = repository
                    .site_labor(tenant_id)
                    .await?
                    .into_iter()
                    .map(|row| {
                        // a site with no recorded hours counts as one hour
                        let hours = if row.hours.is_zero() {
                            Decimal::ONE
                        } else {
                            row.hours
                        };
                        ProjectEfficiency {
                            site_name: row.site_name,
                            revenue_per_hour: (row.revenue / hours).round_dp(2),
                        }
                    })
                    .collect();
                sites.sort_by(|a, b| b.revenue_per_hour.cmp(&a.revenue_per_hour));
                Ok(sites)
            })
            .await
    }

    pub async fn tax_forecast(&self, tenant_id: i64, as_of: NaiveDate) -> Result<TaxForecast> {
        let repository = self.repository.clone();
        self.cache
            .get_or_compute(tenant_id, Metric::TaxForecast, || async move {
                let (from, to, quarter) = quarter_bounds(as_of);
                let collected_tax = repository.collected_tax_between(tenant_id, from, to).await?;
                let quarter_expenses = repository.expenses_between(tenant_id, from, to).await?;
                let estimated_recoverable_tax =
                    (quarter_expenses * RECOVERABLE_TAX_RATE / Decimal::ONE_HUNDRED).round_dp(2);

                Ok(TaxForecast {
                    quarter,
                    collected_tax,
                    estimated_recoverable_tax,
                    net_tax_payable: (collected_tax - estimated_recoverable_tax)
                        .max(Decimal::ZERO),
                })
            })
            .await
    }
}

/// Bucket open balances by days overdue. Invoices without a due date, or due
/// on/after `as_of`, count as current.
pub fn bucket_aging(open: &[OpenInvoice], as_of: NaiveDate) -> AgingBuckets {
    let mut buckets = AgingBuckets::default();
    for invoice in open {
        let amount = invoice.remaining_balance;
        match invoice.due_date {
            None => buckets.current += amount,
            Some(due) if due >= as_of => buckets.current += amount,
            Some(due) => {
                let overdue = (as_of - due).num_days();
                if overdue <= 30 {
                    buckets.overdue_1_30 += amount;
                } else if overdue <= 60 {
                    buckets.overdue_31_60 += amount;
                } else if overdue <= 90 {
                    buckets.overdue_61_90 += amount;
                } else {
                    buckets.overdue_over_90 += amount;
                }
            }
        }
    }
    buckets
}

/// (receivables / trailing sales) × window, one decimal. Zero trailing sales
/// are treated as one so the ratio stays defined.
pub fn compute_dso(total_receivables: Decimal, sales_90_days: Decimal) -> DsoReport {
    let divisor = if sales_90_days.is_zero() {
        Decimal::ONE
    } else {
        sales_90_days
    };
    DsoReport {
        total_receivables,
        sales_90_days,
        days_sales_outstanding: (total_receivables / divisor * Decimal::from(DSO_WINDOW_DAYS))
            .round_dp(1),
    }
}

/// Calendar-quarter window [start, end) containing `as_of`, with its label
pub fn quarter_bounds(as_of: NaiveDate) -> (NaiveDate, NaiveDate, String) {
    let quarter = (as_of.month0() / 3) + 1;
    let start_month = (quarter - 1) * 3 + 1;
    let start = NaiveDate::from_ymd_opt(as_of.year(), start_month, 1)
        .expect("first day of quarter is always valid");
    let end = start + Months::new(3);
    (start, end, format!("{}-Q{}", as_of.year(), quarter))
}
