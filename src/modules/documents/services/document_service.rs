// Document creation and lifecycle orchestration.
//
// Creation pipeline: validate the request, snapshot catalog items into
// lines, aggregate totals, derive the legal amount string, then assign a
// number and insert atomically. Number assignment races are resolved by
// recomputing and retrying a bounded number of times; the tenant's
// analytics cache is invalidated synchronously once the insert commits.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::{EngineError, Result};
use crate::modules::analytics::cache::AnalyticsCache;
use crate::modules::analytics::models::EntityKind;
use crate::modules::catalog::repositories::CatalogItemRepository;
use crate::modules::documents::models::{
    CreateDocumentRequest, DocumentLine, DocumentStatus, FinancialDocument,
};
use crate::modules::documents::repositories::DocumentRepository;
use crate::modules::documents::services::amount_in_words::legal_amount;
use crate::modules::documents::services::line_calculator::LineItemCalculator;
use crate::modules::documents::services::sequencer::{DocumentNumberSequencer, PeriodKey};
use crate::modules::documents::services::totals::DocumentTotalsAggregator;

pub struct DocumentService {
    documents: Arc<dyn DocumentRepository>,
    catalog: Arc<dyn CatalogItemRepository>,
    sequencer: DocumentNumberSequencer,
    cache: Arc<AnalyticsCache>,
    sequence_max_attempts: u32,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        catalog: Arc<dyn CatalogItemRepository>,
        cache: Arc<AnalyticsCache>,
        sequence_max_attempts: u32,
    ) -> Self {
        Self {
            sequencer: DocumentNumberSequencer::new(documents.clone()),
            documents,
            catalog,
            cache,
            sequence_max_attempts,
        }
    }

    /// Create a document with its lines, assigning the next free number.
    ///
    /// # Errors
    /// * `Validation` - empty lines, unknown catalog reference, bad amounts
    /// * `SequenceConflict` - the numbering retries were exhausted; the whole
    ///   call is safe to retry
    pub async fn create_document(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<FinancialDocument> {
        if request.lines.is_empty() {
            return Err(EngineError::validation(
                "lines: a document must have at least one line",
            ));
        }

        // Snapshot + derive each line before touching the store
        let mut lines: Vec<DocumentLine> = Vec::with_capacity(request.lines.len());
        for (position, input) in request.lines.iter().enumerate() {
            let catalog_item = match &input.item_id {
                Some(item_id) => Some(
                    self.catalog
                        .find_by_id(request.tenant_id, item_id)
                        .await?
                        .ok_or_else(|| {
                            EngineError::validation(format!(
                                "item_id: catalog item '{}' not found",
                                item_id
                            ))
                        })?,
                ),
                None => None,
            };
            lines.push(LineItemCalculator::build_line(
                input,
                catalog_item.as_ref(),
                position as i32,
            )?);
        }

        let totals = DocumentTotalsAggregator::aggregate(&lines, request.discount_percentage)?;

        let now = Utc::now();
        let mut document = FinancialDocument {
            id: Uuid::new_v4().to_string(),
            tenant_id: request.tenant_id,
            kind: request.kind,
            document_number: String::new(),
            client_id: request.client_id,
            site_id: request.site_id,
            status: DocumentStatus::Draft,
            subtotal: Decimal::ZERO,
            discount_percentage: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total_ht: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total_ttc: Decimal::ZERO,
            remaining_balance: Decimal::ZERO,
            amount_in_words: Some(legal_amount(totals.total_ttc, request.language)),
            issued_date: request.issued_date,
            due_date: request.due_date,
            project_description: request.project_description.clone(),
            contract_number: request.contract_number.clone(),
            created_at: now,
            updated_at: now,
        };
        document.set_totals(&totals);
        for line in &mut lines {
            line.document_id = document.id.clone();
        }

        let period = PeriodKey::from_date(request.issued_date);
        for attempt in 1..=self.sequence_max_attempts {
            document.document_number = self
                .sequencer
                .next(request.tenant_id, request.kind, period)
                .await?;

            if self.documents.insert_with_lines(&document, &lines).await? {
                info!(
                    tenant_id = request.tenant_id,
                    document_number = %document.document_number,
                    kind = %request.kind,
                    "document created"
                );
                self.cache
                    .invalidate(request.tenant_id, EntityKind::Invoice);
                return Ok(document);
            }

            warn!(
                tenant_id = request.tenant_id,
                document_number = %document.document_number,
                attempt,
                "document number conflict, recomputing"
            );
        }

        Err(EngineError::SequenceConflict {
            tenant_id: request.tenant_id,
            kind: request.kind.to_string(),
            period: period.to_string(),
            attempts: self.sequence_max_attempts,
        })
    }

    pub async fn get_document(&self, tenant_id: i64, id: &str) -> Result<FinancialDocument> {
        self.documents
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| EngineError::not_found(format!("Document '{}' not found", id)))
    }

    pub async fn get_lines(&self, tenant_id: i64, id: &str) -> Result<Vec<DocumentLine>> {
        // scope check first; lines are keyed by document id only
        let document = self.get_document(tenant_id, id).await?;
        self.documents.find_lines(&document.id).await
    }

    /// Apply a manual status transition from the kind's vocabulary.
    ///
    /// Ledger-derived invoice states are rejected here; they only ever come
    /// out of payment recomputation.
    pub async fn transition_status(
        &self,
        tenant_id: i64,
        id: &str,
        to: DocumentStatus,
    ) -> Result<FinancialDocument> {
        let mut document = self.get_document(tenant_id, id).await?;
        document.ensure_transition(to)?;

        self.documents.update_status(tenant_id, id, to).await?;
        self.cache.invalidate(tenant_id, EntityKind::Invoice);
        document.status = to;
        document.updated_at = Utc::now();

        info!(
            tenant_id,
            document_id = id,
            status = %to,
            kind = %document.kind,
            "document status updated"
        );
        Ok(document)
    }
}
