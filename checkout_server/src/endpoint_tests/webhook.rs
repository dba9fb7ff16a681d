use actix_web::{http::StatusCode, web};
use checkout_engine::{
    db_types::TransactionStatus,
    reconciliation_objects::ReconciliationConfig,
    test_utils::webhook_body,
    traits::{CheckoutDatabaseError, FinalizeResult, StockEffect},
    ReconciliationApi,
};
use serde_json::json;

use super::{
    helpers::{flow_api, json, post_request, timestamp, transaction},
    mocks::{MockCheckoutStore, MockGateway},
};
use crate::routes::{GatewayWebhookRoute, EVENT_CHECKSUM_HEADER};

const SIGNED: [(&str, &str); 1] = [(EVENT_CHECKSUM_HEADER, "c0ffee")];

fn webhook_service(db: MockCheckoutStore, gateway: MockGateway) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let api = ReconciliationApi::new(flow_api(db), gateway, ReconciliationConfig::default());
        cfg.service(GatewayWebhookRoute::<MockCheckoutStore, MockGateway>::new()).app_data(web::Data::new(api));
    }
}

fn gateway_with_valid_signatures() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_verify_webhook_signature().returning(|_, sig| sig.to_string() == "c0ffee");
    gateway
}

/// A store that records the delivery verbatim and knows transaction TXN-1.
fn store_with_pending_transaction() -> MockCheckoutStore {
    let mut db = MockCheckoutStore::new();
    db.expect_insert_webhook_event()
        .withf(|ev| ev.event_type.as_deref() == Some("transaction.updated") && ev.received_at == timestamp())
        .times(1)
        .returning(|_| Ok(1));
    db.expect_fetch_transaction_by_reference()
        .withf(|r| r.to_string() == "TXN-1")
        .returning(|_| Ok(Some(transaction(TransactionStatus::Pending, Some("gw-1")))));
    db
}

#[actix_web::test]
async fn approved_payment() {
    let _ = env_logger::try_init().ok();
    let mut db = store_with_pending_transaction();
    db.expect_finalize_transaction()
        .withf(|id, status, gw, _| *id == 1 && *status == TransactionStatus::Approved && gw.as_deref() == Some("gw-1"))
        .times(1)
        .returning(|_, _, _, _| {
            Ok(FinalizeResult::applied(transaction(TransactionStatus::Approved, Some("gw-1")), StockEffect::Committed))
        });
    let body = webhook_body("TXN-1", "gw-1", "APPROVED");
    let (status, body) =
        post_request("/webhooks/gateway", &body, &SIGNED, webhook_service(db, gateway_with_valid_signatures()))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"success": true, "message": "Transaction TXN-1 is now APPROVED"}));
}

#[actix_web::test]
async fn redelivered_event() {
    let _ = env_logger::try_init().ok();
    let mut db = store_with_pending_transaction();
    db.expect_finalize_transaction().times(1).returning(|_, _, _, _| {
        Ok(FinalizeResult::duplicate(transaction(TransactionStatus::Declined, Some("gw-1"))))
    });
    let body = webhook_body("TXN-1", "gw-1", "APPROVED");
    let (status, body) =
        post_request("/webhooks/gateway", &body, &SIGNED, webhook_service(db, gateway_with_valid_signatures()))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"success": true, "message": "Transaction TXN-1 was already DECLINED"}));
}

#[actix_web::test]
async fn invalid_signature_is_recorded_but_not_actioned() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutStore::new();
    db.expect_insert_webhook_event()
        .withf(|ev| ev.signature.as_deref() == Some("deadbeef"))
        .times(1)
        .returning(|_| Ok(7));
    db.expect_fetch_transaction_by_reference().never();
    db.expect_finalize_transaction().never();
    let body = webhook_body("TXN-1", "gw-1", "APPROVED");
    let headers = [(EVENT_CHECKSUM_HEADER, "deadbeef")];
    let (status, body) =
        post_request("/webhooks/gateway", &body, &headers, webhook_service(db, gateway_with_valid_signatures()))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"success": false, "message": "The webhook signature is missing or invalid"}));
}

#[actix_web::test]
async fn missing_signature() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutStore::new();
    db.expect_insert_webhook_event().withf(|ev| ev.signature.is_none()).times(1).returning(|_| Ok(8));
    db.expect_finalize_transaction().never();
    let mut gateway = MockGateway::new();
    gateway.expect_verify_webhook_signature().never();
    let body = webhook_body("TXN-1", "gw-1", "APPROVED");
    let (status, body) = post_request("/webhooks/gateway", &body, &[], webhook_service(db, gateway)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["success"], false);
}

#[actix_web::test]
async fn unknown_reference_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutStore::new();
    db.expect_insert_webhook_event().returning(|_| Ok(2));
    db.expect_fetch_transaction_by_reference().returning(|_| Ok(None));
    db.expect_finalize_transaction().never();
    let body = webhook_body("TXN-404", "gw-404", "APPROVED");
    let (status, body) =
        post_request("/webhooks/gateway", &body, &SIGNED, webhook_service(db, gateway_with_valid_signatures()))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"success": true, "message": "No transaction with reference TXN-404"}));
}

#[actix_web::test]
async fn pending_status_changes_nothing() {
    let _ = env_logger::try_init().ok();
    let mut db = store_with_pending_transaction();
    db.expect_finalize_transaction().never();
    let body = webhook_body("TXN-1", "gw-1", "PENDING");
    let (status, body) =
        post_request("/webhooks/gateway", &body, &SIGNED, webhook_service(db, gateway_with_valid_signatures()))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"success": true, "message": "Transaction TXN-1 is still pending"}));
}

#[actix_web::test]
async fn processing_failure_still_answers_ok() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutStore::new();
    db.expect_insert_webhook_event()
        .returning(|_| Err(CheckoutDatabaseError::DatabaseError("database is locked".into())));
    db.expect_finalize_transaction().never();
    let body = webhook_body("TXN-1", "gw-1", "APPROVED");
    let (status, body) =
        post_request("/webhooks/gateway", &body, &SIGNED, webhook_service(db, gateway_with_valid_signatures()))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["success"], false);
}

#[actix_web::test]
async fn garbage_body_is_recorded() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutStore::new();
    db.expect_insert_webhook_event()
        .withf(|ev| ev.payload == "not json at all" && ev.event_type.is_none())
        .times(1)
        .returning(|_| Ok(3));
    let (status, body) = post_request(
        "/webhooks/gateway",
        "not json at all",
        &SIGNED,
        webhook_service(db, gateway_with_valid_signatures()),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["success"], false);
}
