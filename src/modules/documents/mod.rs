//! Financial documents: invoices, quotes and purchase orders.
//!
//! Covers number sequencing, line normalization with catalog snapshots,
//! totals aggregation (generic and statutory-retention paths) and the
//! legal amount-in-words string.

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{
    CreateDocumentRequest, DocumentKind, DocumentLine, DocumentStatus, DocumentTotals,
    FinancialDocument, LineInput,
};
pub use services::{DocumentService, DocumentTotalsAggregator, LineItemCalculator, PeriodKey};
