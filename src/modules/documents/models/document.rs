// Financial document model shared by invoices, quotes and purchase orders.
//
// The three kinds carry the same shape and differ only in their status
// vocabulary and numbering scope. A document's number and lines are
// immutable once persisted; a correction requires a replacement document.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::totals::DocumentTotals;
use crate::core::{EngineError, Result};

/// Kind of financial document; scopes numbering and the status vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Invoice,
    Quote,
    PurchaseOrder,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INVOICE",
            DocumentKind::Quote => "QUOTE",
            DocumentKind::PurchaseOrder => "PURCHASE_ORDER",
        }
    }

    /// Manual status transitions a collaborator may request for this kind.
    ///
    /// Ledger-derived invoice states (PARTIALLY_PAID, PAID and the regression
    /// back to COMPLETED) are excluded on purpose: only payment recomputation
    /// produces them.
    pub fn allows_transition(&self, from: DocumentStatus, to: DocumentStatus) -> bool {
        use DocumentStatus::*;
        match self {
            DocumentKind::Invoice => matches!((from, to), (Draft, Completed)),
            DocumentKind::Quote => matches!(
                (from, to),
                (Draft, Sent) | (Sent, Accepted) | (Sent, Rejected) | (Sent, Expired)
            ),
            DocumentKind::PurchaseOrder => matches!(
                (from, to),
                (Draft, Sent)
                    | (Sent, Confirmed)
                    | (Confirmed, Completed)
                    | (Draft, Cancelled)
                    | (Sent, Cancelled)
                    | (Confirmed, Cancelled)
            ),
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "INVOICE" => Ok(DocumentKind::Invoice),
            "QUOTE" => Ok(DocumentKind::Quote),
            "PURCHASE_ORDER" => Ok(DocumentKind::PurchaseOrder),
            _ => Err(format!("Invalid document kind: {}", s)),
        }
    }
}

/// Union of the three per-kind status vocabularies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Completed,
    PartiallyPaid,
    Paid,
    Sent,
    Accepted,
    Rejected,
    Expired,
    Confirmed,
    Cancelled,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "DRAFT",
            DocumentStatus::Completed => "COMPLETED",
            DocumentStatus::PartiallyPaid => "PARTIALLY_PAID",
            DocumentStatus::Paid => "PAID",
            DocumentStatus::Sent => "SENT",
            DocumentStatus::Accepted => "ACCEPTED",
            DocumentStatus::Rejected => "REJECTED",
            DocumentStatus::Expired => "EXPIRED",
            DocumentStatus::Confirmed => "CONFIRMED",
            DocumentStatus::Cancelled => "CANCELLED",
        }
    }

    /// Whether this status belongs to the given kind's vocabulary
    pub fn valid_for(&self, kind: DocumentKind) -> bool {
        use DocumentStatus::*;
        match kind {
            DocumentKind::Invoice => matches!(self, Draft | Completed | PartiallyPaid | Paid),
            DocumentKind::Quote => matches!(self, Draft | Sent | Accepted | Rejected | Expired),
            DocumentKind::PurchaseOrder => {
                matches!(self, Draft | Sent | Confirmed | Completed | Cancelled)
            }
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(DocumentStatus::Draft),
            "COMPLETED" => Ok(DocumentStatus::Completed),
            "PARTIALLY_PAID" => Ok(DocumentStatus::PartiallyPaid),
            "PAID" => Ok(DocumentStatus::Paid),
            "SENT" => Ok(DocumentStatus::Sent),
            "ACCEPTED" => Ok(DocumentStatus::Accepted),
            "REJECTED" => Ok(DocumentStatus::Rejected),
            "EXPIRED" => Ok(DocumentStatus::Expired),
            "CONFIRMED" => Ok(DocumentStatus::Confirmed),
            "CANCELLED" => Ok(DocumentStatus::Cancelled),
            _ => Err(format!("Invalid document status: {}", s)),
        }
    }
}

/// A persisted financial document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialDocument {
    pub id: String,
    pub tenant_id: i64,
    pub kind: DocumentKind,
    /// `{year}-{month}-{sequence}`; assigned once at creation, never changed
    pub document_number: String,
    pub client_id: i64,
    pub site_id: Option<i64>,
    pub status: DocumentStatus,

    pub subtotal: Decimal,
    pub discount_percentage: Decimal,
    pub discount_amount: Decimal,
    pub total_ht: Decimal,
    pub tax_amount: Decimal,
    pub total_ttc: Decimal,
    /// `total_ttc` minus active payments, clamped at zero; invoices only
    pub remaining_balance: Decimal,

    pub amount_in_words: Option<String>,
    pub issued_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub project_description: Option<String>,
    pub contract_number: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinancialDocument {
    /// Apply freshly aggregated totals; the remaining balance starts at the
    /// grand total since no payment can predate the document.
    pub fn set_totals(&mut self, totals: &DocumentTotals) {
        self.subtotal = totals.subtotal;
        self.discount_percentage = totals.discount_percentage;
        self.discount_amount = totals.discount_amount;
        self.total_ht = totals.total_ht;
        self.tax_amount = totals.tax_amount;
        self.total_ttc = totals.total_ttc;
        self.remaining_balance = totals.total_ttc;
    }

    /// Validate a manual status transition for this document's kind
    pub fn ensure_transition(&self, to: DocumentStatus) -> Result<()> {
        if !to.valid_for(self.kind) {
            return Err(EngineError::validation(format!(
                "Status {} is not part of the {} vocabulary",
                to, self.kind
            )));
        }
        if !self.kind.allows_transition(self.status, to) {
            return Err(EngineError::validation(format!(
                "Invalid status transition from {} to {} for {}",
                self.status, to, self.kind
            )));
        }
        Ok(())
    }
}
