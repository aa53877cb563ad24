// Document number sequencing.
//
// Numbers are `{year:04}-{month:02}-{seq:04}` (e.g. `2025-03-0007`), a
// compatibility contract with already-printed documents. The sequence is
// scoped per (tenant, document kind, calendar month of the issue date) and
// is gap-tolerant: a rolled-back or voided document never releases its
// number back to the pool.
//
// `next` computes max+1 from persisted numbers; the uniqueness constraint on
// the document INSERT is what serializes concurrent writers, with the
// creating service retrying on conflict.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::modules::documents::models::DocumentKind;
use crate::modules::documents::repositories::DocumentRepository;

/// Calendar-month scope of a document number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The number prefix, `{year:04}-{month:02}`
    pub fn prefix(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Full document number for a sequence value
    pub fn number(&self, sequence: u32) -> String {
        format!("{}-{:04}", self.prefix(), sequence)
    }

    /// Parse the sequence back out of a number with this prefix
    pub fn sequence_of(&self, document_number: &str) -> Option<u32> {
        let suffix = document_number.strip_prefix(&self.prefix())?.strip_prefix('-')?;
        suffix.parse().ok()
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.prefix())
    }
}

/// Issues candidate document numbers from the persisted high-water mark
pub struct DocumentNumberSequencer {
    repository: Arc<dyn DocumentRepository>,
}

impl DocumentNumberSequencer {
    pub fn new(repository: Arc<dyn DocumentRepository>) -> Self {
        Self { repository }
    }

    /// Smallest positive sequence not yet used for the triple, as a formatted
    /// number. Subject to lost races; the caller's INSERT must enforce
    /// uniqueness and retry.
    pub async fn next(
        &self,
        tenant_id: i64,
        kind: DocumentKind,
        period: PeriodKey,
    ) -> Result<String> {
        let highest = self
            .repository
            .highest_sequence(tenant_id, kind, &period)
            .await?;
        Ok(period.number(highest + 1))
    }
}
