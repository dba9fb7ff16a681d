use actix_web::{http::StatusCode, web};
use checkout_engine::db_types::TransactionStatus;
use serde_json::json;

use super::{
    helpers::{flow_api, get_request, json, transaction},
    mocks::MockCheckoutStore,
};
use crate::routes::TransactionByIdRoute;

fn transaction_service(db: MockCheckoutStore) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(TransactionByIdRoute::<MockCheckoutStore>::new()).app_data(web::Data::new(flow_api(db)));
    }
}

#[actix_web::test]
async fn fetch_transaction_status() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutStore::new();
    db.expect_fetch_transaction()
        .withf(|id| *id == 1)
        .returning(|_| Ok(Some(transaction(TransactionStatus::Approved, Some("gw-1")))));
    let (status, body) = get_request("/transactions/1", transaction_service(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        json!({
            "id": 1,
            "reference": "TXN-1",
            "product_id": 1,
            "quantity": 2,
            "total": 3_650_000,
            "status": "APPROVED",
            "reserved_until": "2024-06-01T12:15:00Z",
            "updated_at": "2024-06-01T12:00:00Z"
        })
    );
}

#[actix_web::test]
async fn unknown_transaction() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutStore::new();
    db.expect_fetch_transaction().returning(|_| Ok(None));
    let (status, body) = get_request("/transactions/99", transaction_service(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body), json!({"error": "The data was not found. Transaction 99 does not exist"}));
}

#[actix_web::test]
async fn malformed_id() {
    let _ = env_logger::try_init().ok();
    let db = MockCheckoutStore::new();
    let (status, _) = get_request("/transactions/TXN-1", transaction_service(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
}
