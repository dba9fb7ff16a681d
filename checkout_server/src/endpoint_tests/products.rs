use actix_web::{http::StatusCode, web};
use checkout_engine::{traits::InventoryError, CatalogApi};
use serde_json::json;

use super::{
    helpers::{get_request, hammock, json},
    mocks::MockCheckoutStore,
};
use crate::routes::{ProductByIdRoute, ProductsRoute};

fn catalog_service(db: MockCheckoutStore) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(ProductsRoute::<MockCheckoutStore>::new())
            .service(ProductByIdRoute::<MockCheckoutStore>::new())
            .app_data(web::Data::new(CatalogApi::new(db)));
    }
}

#[actix_web::test]
async fn list_products() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutStore::new();
    db.expect_fetch_products().returning(|| Ok(vec![hammock()]));
    let (status, body) = get_request("/products", catalog_service(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        json!([{
            "id": 1,
            "name": "Wayuu hammock",
            "description": "Hand woven",
            "price": 1_200_000,
            "available": 7,
            "image_url": "https://img.example.com/hammock.png"
        }])
    );
}

#[actix_web::test]
async fn fetch_product_by_id() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutStore::new();
    db.expect_fetch_product().withf(|id| *id == 1).returning(|_| Ok(Some(hammock())));
    let (status, body) = get_request("/products/1", catalog_service(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["available"], 7);
}

#[actix_web::test]
async fn unknown_product() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutStore::new();
    db.expect_fetch_product().returning(|_| Ok(None));
    let (status, body) = get_request("/products/42", catalog_service(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body), json!({"error": "The data was not found. Product 42 does not exist"}));
}

#[actix_web::test]
async fn storage_failure() {
    let _ = env_logger::try_init().ok();
    let mut db = MockCheckoutStore::new();
    db.expect_fetch_products().returning(|| Err(InventoryError::DatabaseError("disk I/O error".into())));
    let (status, _) = get_request("/products", catalog_service(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
