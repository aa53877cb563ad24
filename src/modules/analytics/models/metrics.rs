// Metric catalog and aggregate value shapes.
//
// Metric names are the public contract of `get_analytics`; the value shapes
// are what the cache stores (as JSON) and what the API layer serializes out.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Source entities whose mutations invalidate a tenant's aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Invoice,
    Payment,
    Expense,
    Client,
    Attendance,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Invoice => "invoice",
            EntityKind::Payment => "payment",
            EntityKind::Expense => "expense",
            EntityKind::Client => "client",
            EntityKind::Attendance => "attendance",
        };
        f.write_str(name)
    }
}

/// The fixed set of per-tenant cached aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    KpiSummary,
    RevenueTrend,
    ExpenseBreakdown,
    SiteProfitability,
    ArAging,
    Dso,
    ClientConcentration,
    LaborIntensity,
    ProjectEfficiency,
    TaxForecast,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::KpiSummary => "kpi_summary",
            Metric::RevenueTrend => "revenue_trend",
            Metric::ExpenseBreakdown => "expense_breakdown",
            Metric::SiteProfitability => "site_profitability",
            Metric::ArAging => "ar_aging",
            Metric::Dso => "dso",
            Metric::ClientConcentration => "client_concentration",
            Metric::LaborIntensity => "labor_intensity",
            Metric::ProjectEfficiency => "project_efficiency",
            Metric::TaxForecast => "tax_forecast",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "kpi_summary" => Ok(Metric::KpiSummary),
            "revenue_trend" => Ok(Metric::RevenueTrend),
            "expense_breakdown" => Ok(Metric::ExpenseBreakdown),
            "site_profitability" => Ok(Metric::SiteProfitability),
            "ar_aging" => Ok(Metric::ArAging),
            "dso" => Ok(Metric::Dso),
            "client_concentration" => Ok(Metric::ClientConcentration),
            "labor_intensity" => Ok(Metric::LaborIntensity),
            "project_efficiency" => Ok(Metric::ProjectEfficiency),
            "tax_forecast" => Ok(Metric::TaxForecast),
            _ => Err(format!("Unknown analytics metric: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_revenue: Decimal,
    pub total_collected: Decimal,
    pub outstanding_balance: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    pub invoice_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    /// `{year}-{month}` key, ascending
    pub month: String,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategoryTotal {
    pub category: String,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfitability {
    pub site_name: String,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub margin: Decimal,
}

/// Accounts-receivable aging buckets, keyed by days overdue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingBuckets {
    pub current: Decimal,
    pub overdue_1_30: Decimal,
    pub overdue_31_60: Decimal,
    pub overdue_61_90: Decimal,
    pub overdue_over_90: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsoReport {
    pub total_receivables: Decimal,
    pub sales_90_days: Decimal,
    /// (receivables / trailing 90-day sales) × 90, one decimal
    pub days_sales_outstanding: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRevenue {
    pub client_id: i64,
    pub company_name: String,
    pub total_invoiced: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborIntensity {
    pub total_hours: Decimal,
    pub total_presences: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEfficiency {
    pub site_name: String,
    pub revenue_per_hour: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxForecast {
    /// e.g. `2025-Q3`
    pub quarter: String,
    pub collected_tax: Decimal,
    pub estimated_recoverable_tax: Decimal,
    pub net_tax_payable: Decimal,
}

/// Raw unpaid-invoice row driving aging and DSO
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInvoice {
    pub total_ttc: Decimal,
    pub remaining_balance: Decimal,
    pub due_date: Option<NaiveDate>,
}

/// Raw per-site revenue/expense row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLedgerRow {
    pub site_name: String,
    pub revenue: Decimal,
    pub expenses: Decimal,
}

/// Raw per-site revenue/hours row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLaborRow {
    pub site_name: String,
    pub revenue: Decimal,
    pub hours: Decimal,
}
