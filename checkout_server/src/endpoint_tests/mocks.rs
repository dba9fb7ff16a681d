use checkout_engine::{
    db_types::{NewProduct, NewTransaction, NewWebhookEvent, Product, Transaction, TransactionStatus, WebhookEvent},
    gateway_objects::{GatewayTransaction, NewGatewayTransaction},
    traits::{
        CheckoutDatabase,
        CheckoutDatabaseError,
        FinalizeResult,
        GatewayError,
        InventoryError,
        InventoryManagement,
        PaymentGateway,
    },
};
use chrono::{DateTime, Utc};
use mockall::mock;
use serde_json::Value;

mock! {
    pub CheckoutStore {}
    impl Clone for CheckoutStore {
        fn clone(&self) -> Self;
    }
    impl InventoryManagement for CheckoutStore {
        async fn insert_product(&self, product: NewProduct) -> Result<Product, InventoryError>;
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, InventoryError>;
        async fn fetch_products(&self) -> Result<Vec<Product>, InventoryError>;
        async fn reserve_stock(&self, product_id: i64, quantity: i64) -> Result<bool, InventoryError>;
        async fn release_stock(&self, product_id: i64, quantity: i64) -> Result<bool, InventoryError>;
        async fn commit_stock(&self, product_id: i64, quantity: i64) -> Result<bool, InventoryError>;
    }
    impl CheckoutDatabase for CheckoutStore {
        fn url(&self) -> &str;
        async fn insert_pending_transaction(&self, transaction: NewTransaction) -> Result<Transaction, CheckoutDatabaseError>;
        async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, CheckoutDatabaseError>;
        async fn fetch_transaction_by_reference(&self, reference: &str) -> Result<Option<Transaction>, CheckoutDatabaseError>;
        async fn record_gateway_txn_id(&self, id: i64, gateway_txn_id: &str, now: DateTime<Utc>) -> Result<Transaction, CheckoutDatabaseError>;
        async fn finalize_transaction(&self, id: i64, status: TransactionStatus, gateway_txn_id: Option<String>, now: DateTime<Utc>) -> Result<FinalizeResult, CheckoutDatabaseError>;
        async fn find_expired_pending_reservations(&self, now: DateTime<Utc>) -> Result<Vec<Transaction>, CheckoutDatabaseError>;
        async fn insert_webhook_event(&self, event: NewWebhookEvent) -> Result<i64, CheckoutDatabaseError>;
        async fn fetch_recent_webhook_events(&self, limit: i64) -> Result<Vec<WebhookEvent>, CheckoutDatabaseError>;
        async fn close(&mut self) -> Result<(), CheckoutDatabaseError>;
    }
}

mock! {
    pub Gateway {}
    impl Clone for Gateway {
        fn clone(&self) -> Self;
    }
    impl PaymentGateway for Gateway {
        async fn create_transaction(&self, transaction: NewGatewayTransaction) -> Result<GatewayTransaction, GatewayError>;
        async fn fetch_transaction(&self, gateway_txn_id: &str) -> Result<GatewayTransaction, GatewayError>;
        fn verify_webhook_signature(&self, payload: &Value, signature: &str) -> bool;
    }
}
