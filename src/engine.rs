// Engine facade.
//
// Bundles the document, ledger and analytics services over one set of
// repositories; this is the surface the API layer calls. Collaborators that
// own client/expense/attendance mutations report them through
// `on_entity_changed` so the tenant's cached aggregates stay consistent.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::config::BillingConfig;
use crate::core::Result;
use crate::modules::analytics::cache::AnalyticsCache;
use crate::modules::analytics::models::EntityKind;
use crate::modules::analytics::repositories::{AnalyticsRepository, MySqlAnalyticsRepository};
use crate::modules::analytics::services::AnalyticsService;
use crate::modules::catalog::repositories::{CatalogItemRepository, MySqlCatalogItemRepository};
use crate::modules::documents::models::{CreateDocumentRequest, FinancialDocument};
use crate::modules::documents::repositories::{DocumentRepository, MySqlDocumentRepository};
use crate::modules::documents::services::DocumentService;
use crate::modules::payments::models::{LedgerPolicy, LedgerState, NewPayment};
use crate::modules::payments::repositories::{MySqlPaymentRepository, PaymentRepository};
use crate::modules::payments::services::PaymentLedger;

pub struct BillingEngine {
    documents: DocumentService,
    ledger: PaymentLedger,
    analytics: AnalyticsService,
    cache: Arc<AnalyticsCache>,
}

impl BillingEngine {
    /// Wire the engine over explicit repositories; tests substitute
    /// in-memory implementations here.
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        catalog: Arc<dyn CatalogItemRepository>,
        payments: Arc<dyn PaymentRepository>,
        analytics: Arc<dyn AnalyticsRepository>,
        config: BillingConfig,
    ) -> Self {
        let cache = Arc::new(AnalyticsCache::new(Duration::from_secs(
            config.analytics_ttl_minutes * 60,
        )));

        Self {
            documents: DocumentService::new(
                documents,
                catalog,
                cache.clone(),
                config.sequence_max_attempts,
            ),
            ledger: PaymentLedger::new(
                payments,
                cache.clone(),
                LedgerPolicy {
                    complete_draft_on_refund: config.complete_draft_on_refund,
                },
            ),
            analytics: AnalyticsService::new(analytics, cache.clone()),
            cache,
        }
    }

    /// Production wiring over a shared MySQL pool
    pub fn from_pool(pool: MySqlPool, config: BillingConfig) -> Self {
        Self::new(
            Arc::new(MySqlDocumentRepository::new(pool.clone())),
            Arc::new(MySqlCatalogItemRepository::new(pool.clone())),
            Arc::new(MySqlPaymentRepository::new(pool.clone())),
            Arc::new(MySqlAnalyticsRepository::new(pool)),
            config,
        )
    }

    /// Assign a number, compute totals and persist a new document
    pub async fn create_document(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<FinancialDocument> {
        self.documents.create_document(request).await
    }

    /// Record a payment against an invoice and return the new ledger state
    pub async fn record_payment(
        &self,
        tenant_id: i64,
        invoice_id: &str,
        payment: NewPayment,
    ) -> Result<LedgerState> {
        self.ledger.record_payment(tenant_id, invoice_id, payment).await
    }

    /// Delete a payment and return the new ledger state
    pub async fn delete_payment(&self, tenant_id: i64, payment_id: &str) -> Result<LedgerState> {
        self.ledger.delete_payment(tenant_id, payment_id).await
    }

    /// Read a cached analytics metric by name, recomputing on a miss
    pub async fn get_analytics(
        &self,
        tenant_id: i64,
        metric: &str,
        as_of: NaiveDate,
    ) -> Result<serde_json::Value> {
        self.analytics.get(tenant_id, metric, as_of).await
    }

    /// Invalidation hook for collaborator-owned mutations
    pub fn on_entity_changed(&self, tenant_id: i64, entity: EntityKind) {
        self.cache.invalidate(tenant_id, entity);
    }

    pub fn documents(&self) -> &DocumentService {
        &self.documents
    }

    pub fn ledger(&self) -> &PaymentLedger {
        &self.ledger
    }

    pub fn analytics(&self) -> &AnalyticsService {
        &self.analytics
    }
}
