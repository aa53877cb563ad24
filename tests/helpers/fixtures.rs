use std::sync::Arc;

use rust_decimal::Decimal;

use facturier::config::BillingConfig;
use facturier::modules::documents::models::{CreateDocumentRequest, DocumentKind, LineInput};
use facturier::BillingEngine;

use super::memory::MemoryStore;

pub const TENANT: i64 = 1;

/// Engine wired over one shared in-memory store
pub fn engine_with_store() -> (BillingEngine, Arc<MemoryStore>) {
    engine_with_config(BillingConfig::default())
}

pub fn engine_with_config(config: BillingConfig) -> (BillingEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = BillingEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        config,
    );
    (engine, store)
}

pub fn line(name: &str, quantity: i64, unit_price: i64, tax_rate: i64) -> LineInput {
    LineInput {
        item_name: Some(name.to_string()),
        unit: Some("M²".to_string()),
        quantity: Decimal::from(quantity),
        unit_price: Some(Decimal::from(unit_price)),
        tax_rate: Some(Decimal::from(tax_rate)),
        ..Default::default()
    }
}

/// The reference invoice from the ledger fixtures:
/// [2 × 100 @ 20%] + [1 × 50 @ 20%], no discount -> 250 / 50 / 300
pub fn reference_invoice_request(tenant_id: i64) -> CreateDocumentRequest {
    CreateDocumentRequest {
        tenant_id,
        kind: DocumentKind::Invoice,
        client_id: 1,
        site_id: None,
        lines: vec![line("Gros œuvre", 2, 100, 20), line("Finitions", 1, 50, 20)],
        discount_percentage: Decimal::ZERO,
        issued_date: "2025-03-14".parse().unwrap(),
        due_date: Some("2025-04-14".parse().unwrap()),
        language: Default::default(),
        project_description: None,
        contract_number: None,
    }
}
