// End-to-end payment reconciliation over the engine facade:
// record -> recompute -> status transition, delete -> regression, and the
// overpayment invariant leaving state untouched.

use rust_decimal_macros::dec;

use facturier::modules::documents::models::DocumentStatus;
use facturier::EngineError;

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::fixtures::{engine_with_store, reference_invoice_request, TENANT};
use helpers::memory::cash_payment;

#[tokio::test]
async fn test_partial_then_full_payment() {
    let (engine, _store) = engine_with_store();
    let invoice = engine
        .create_document(reference_invoice_request(TENANT))
        .await
        .unwrap();
    engine
        .documents()
        .transition_status(TENANT, &invoice.id, DocumentStatus::Completed)
        .await
        .unwrap();

    let state = engine
        .record_payment(TENANT, &invoice.id, cash_payment(dec!(100), "2025-03-20"))
        .await
        .unwrap();
    assert_eq!(state.status, DocumentStatus::PartiallyPaid);
    assert_eq!(state.remaining_balance, dec!(200));

    let state = engine
        .record_payment(TENANT, &invoice.id, cash_payment(dec!(200), "2025-03-25"))
        .await
        .unwrap();
    assert_eq!(state.status, DocumentStatus::Paid);
    assert_eq!(state.remaining_balance, dec!(0));
}

#[tokio::test]
async fn test_overpayment_rejected_and_state_unchanged() {
    let (engine, store) = engine_with_store();
    let invoice = engine
        .create_document(reference_invoice_request(TENANT))
        .await
        .unwrap();
    engine
        .documents()
        .transition_status(TENANT, &invoice.id, DocumentStatus::Completed)
        .await
        .unwrap();
    engine
        .record_payment(TENANT, &invoice.id, cash_payment(dec!(250), "2025-03-20"))
        .await
        .unwrap();

    let err = engine
        .record_payment(TENANT, &invoice.id, cash_payment(dec!(100), "2025-03-21"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Overpayment { .. }));

    // nothing was written, nothing was recomputed
    let stored = store.document(&invoice.id).unwrap();
    assert_eq!(stored.status, DocumentStatus::PartiallyPaid);
    assert_eq!(stored.remaining_balance, dec!(50));
    assert_eq!(store.payment_ids(&invoice.id).len(), 1);

    // the exact remainder still fits
    let state = engine
        .record_payment(TENANT, &invoice.id, cash_payment(dec!(50), "2025-03-22"))
        .await
        .unwrap();
    assert_eq!(state.status, DocumentStatus::Paid);
}

#[tokio::test]
async fn test_deleting_payments_regresses_status() {
    let (engine, store) = engine_with_store();
    let invoice = engine
        .create_document(reference_invoice_request(TENANT))
        .await
        .unwrap();
    engine
        .documents()
        .transition_status(TENANT, &invoice.id, DocumentStatus::Completed)
        .await
        .unwrap();

    engine
        .record_payment(TENANT, &invoice.id, cash_payment(dec!(100), "2025-03-20"))
        .await
        .unwrap();
    engine
        .record_payment(TENANT, &invoice.id, cash_payment(dec!(200), "2025-03-25"))
        .await
        .unwrap();

    let payment_ids = store.payment_ids(&invoice.id);
    assert_eq!(payment_ids.len(), 2);

    // drop one payment: back to PARTIALLY_PAID
    let state = engine
        .delete_payment(TENANT, &payment_ids[0])
        .await
        .unwrap();
    assert_eq!(state.status, DocumentStatus::PartiallyPaid);

    // drop the other: a document that had left DRAFT regresses to COMPLETED
    let state = engine
        .delete_payment(TENANT, &payment_ids[1])
        .await
        .unwrap();
    assert_eq!(state.status, DocumentStatus::Completed);
    assert_eq!(state.remaining_balance, dec!(300));
}

#[tokio::test]
async fn test_payment_on_draft_moves_it_to_partially_paid() {
    let (engine, _store) = engine_with_store();
    let invoice = engine
        .create_document(reference_invoice_request(TENANT))
        .await
        .unwrap();

    let state = engine
        .record_payment(TENANT, &invoice.id, cash_payment(dec!(100), "2025-03-20"))
        .await
        .unwrap();
    assert_eq!(state.status, DocumentStatus::PartiallyPaid);
}

#[tokio::test]
async fn test_non_positive_amounts_are_rejected() {
    let (engine, _store) = engine_with_store();
    let invoice = engine
        .create_document(reference_invoice_request(TENANT))
        .await
        .unwrap();

    let err = engine
        .record_payment(TENANT, &invoice.id, cash_payment(dec!(0), "2025-03-20"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn test_unknown_invoice_and_payment_are_not_found() {
    let (engine, _store) = engine_with_store();

    let err = engine
        .record_payment(TENANT, "missing", cash_payment(dec!(10), "2025-03-20"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine.delete_payment(TENANT, "missing").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn test_payments_only_apply_to_invoices() {
    let (engine, _store) = engine_with_store();

    let mut request = reference_invoice_request(TENANT);
    request.kind = facturier::modules::documents::models::DocumentKind::Quote;
    let quote = engine.create_document(request).await.unwrap();

    let err = engine
        .record_payment(TENANT, &quote.id, cash_payment(dec!(10), "2025-03-20"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}
