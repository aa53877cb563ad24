pub mod metrics;

pub use metrics::{
    AgingBuckets, ClientRevenue, DsoReport, EntityKind, ExpenseCategoryTotal, KpiSummary,
    LaborIntensity, Metric, MonthlyRevenue, OpenInvoice, ProjectEfficiency, SiteLaborRow,
    SiteLedgerRow, SiteProfitability, TaxForecast,
};
