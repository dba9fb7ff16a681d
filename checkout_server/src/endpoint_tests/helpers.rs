use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use checkout_engine::{
    db_types::{Cents, Product, Transaction, TransactionStatus},
    events::EventProducers,
    test_utils::FixedClock,
    traits::CheckoutDatabase,
    TransactionFlowApi,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use log::debug;
use serde_json::Value;

pub async fn get_request<F>(path: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    call(TestRequest::get().uri(path), configure).await
}

pub async fn post_request<F>(
    path: &str,
    body: &str,
    headers: &[(&str, &str)],
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut req = TestRequest::post().uri(path).insert_header(("content-type", "application/json"));
    for &header in headers {
        req = req.insert_header(header);
    }
    call(req.set_payload(body.to_string()), configure).await
}

async fn call<F>(req: TestRequest, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let req = req.to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"))
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// A flow API without event subscribers, whose clock is stopped at [`timestamp`].
pub fn flow_api<B: CheckoutDatabase>(db: B) -> TransactionFlowApi<B> {
    TransactionFlowApi::new(db, EventProducers::default(), FixedClock::new(timestamp()).shared())
}

pub fn hammock() -> Product {
    Product {
        id: 1,
        name: "Wayuu hammock".into(),
        description: "Hand woven".into(),
        price: Cents::from(1_200_000),
        stock_quantity: 10,
        reserved_quantity: 3,
        image_url: Some("https://img.example.com/hammock.png".into()),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// Transaction #1: 2 hammocks, with a base fee of 2,500 COP and a delivery fee of 10,000 COP.
pub fn transaction(status: TransactionStatus, gateway_txn_id: Option<&str>) -> Transaction {
    Transaction {
        id: 1,
        reference: "TXN-1".into(),
        product_id: 1,
        customer_id: 1,
        delivery_id: 1,
        quantity: 2,
        unit_price: Cents::from(1_200_000),
        base_fee: Cents::from(250_000),
        delivery_fee: Cents::from(1_000_000),
        total: Cents::from(3_650_000),
        status,
        gateway_txn_id: gateway_txn_id.map(String::from),
        reserved_until: timestamp() + Duration::minutes(15),
        stock_committed_at: None,
        stock_released_at: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}
