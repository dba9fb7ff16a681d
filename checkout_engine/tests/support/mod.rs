#![allow(dead_code)]
use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};

use checkout_engine::{
    checkout_objects::{CheckoutConfig, CustomerDetails, DeliveryDetails},
    db_types::{Cents, NewProduct, NewTransaction, Product, Transaction},
    events::{EventHandlers, EventHooks, PollRequestedEvent, TransactionUpdatedEvent},
    reconciliation_objects::ReconciliationConfig,
    test_utils::{prepare_env::prepare_fresh_database, FakeGateway, FixedClock},
    traits::{CheckoutDatabase, InventoryManagement},
    CheckoutApi,
    ReconciliationApi,
    SqliteDatabase,
    TransactionFlowApi,
};
use chrono::Duration as ChronoDuration;
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// Records every event the engine publishes.
#[derive(Clone, Default)]
pub struct EventLog {
    pub updates: Arc<Mutex<Vec<TransactionUpdatedEvent>>>,
    pub polls: Arc<Mutex<Vec<PollRequestedEvent>>>,
}

impl EventLog {
    pub fn hooks(&self) -> EventHooks {
        let mut hooks = EventHooks::default();
        let updates = self.updates.clone();
        hooks.on_transaction_updated(move |ev| {
            let updates = updates.clone();
            Box::pin(async move {
                updates.lock().unwrap().push(ev);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let polls = self.polls.clone();
        hooks.on_poll_requested(move |ev| {
            let polls = polls.clone();
            Box::pin(async move {
                polls.lock().unwrap().push(ev);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        hooks
    }

    pub fn updates(&self) -> Vec<TransactionUpdatedEvent> {
        self.updates.lock().unwrap().clone()
    }

    pub fn polls(&self) -> Vec<PollRequestedEvent> {
        self.polls.lock().unwrap().clone()
    }

    /// Waits (up to 2s) until at least `n` update events have been handled.
    pub async fn wait_for_updates(&self, n: usize) -> Vec<TransactionUpdatedEvent> {
        for _ in 0..40 {
            if self.updates.lock().unwrap().len() >= n {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.updates()
    }

    pub async fn wait_for_polls(&self, n: usize) -> Vec<PollRequestedEvent> {
        for _ in 0..40 {
            if self.polls.lock().unwrap().len() >= n {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.polls()
    }
}

pub struct TestSystem {
    pub url: String,
    pub db: SqliteDatabase,
    pub clock: FixedClock,
    pub gateway: FakeGateway,
    pub events: EventLog,
    pub flow: TransactionFlowApi<SqliteDatabase>,
    pub checkout: CheckoutApi<SqliteDatabase, FakeGateway>,
    pub reconciliation: ReconciliationApi<SqliteDatabase, FakeGateway>,
}

pub const BASE_FEE: i64 = 250_000;
pub const DELIVERY_FEE: i64 = 1_000_000;

impl TestSystem {
    pub async fn new() -> Self {
        let url = prepare_fresh_database().await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        let clock = FixedClock::default();
        let gateway = FakeGateway::new();
        let events = EventLog::default();
        let handlers = EventHandlers::new(64, events.hooks());
        let producers = handlers.producers();
        handlers.start_handlers().await;
        let flow = TransactionFlowApi::new(db.clone(), producers, clock.shared());
        let config = CheckoutConfig {
            base_fee: Cents::from(BASE_FEE),
            delivery_fee: Cents::from(DELIVERY_FEE),
            hold_duration: ChronoDuration::minutes(15),
        };
        let checkout = CheckoutApi::new(flow.clone(), gateway.clone(), config);
        let reconciliation = ReconciliationApi::new(flow.clone(), gateway.clone(), ReconciliationConfig::default());
        Self { url, db, clock, gateway, events, flow, checkout, reconciliation }
    }

    pub async fn add_product(&self, name: &str, price: i64, stock: i64) -> Product {
        let product = NewProduct::new(name, Cents::from(price), stock).with_description(format!("A fine {name}"));
        self.db.insert_product(product).await.expect("Error inserting product")
    }

    pub async fn product(&self, id: i64) -> Product {
        self.db.fetch_product(id).await.expect("Error fetching product").expect("Product does not exist")
    }

    pub async fn transaction(&self, id: i64) -> Transaction {
        self.db.fetch_transaction(id).await.expect("Error fetching transaction").expect("Transaction does not exist")
    }

    /// Reserves stock and stores a pending transaction directly, bypassing the checkout flow.
    pub async fn pending_transaction(&self, product: &Product, quantity: i64) -> Transaction {
        assert!(self.db.reserve_stock(product.id, quantity).await.unwrap(), "Could not reserve stock");
        self.unreserved_transaction(product, quantity).await
    }

    /// A pending transaction that holds no reservation, as created by older versions of the checkout.
    pub async fn unreserved_transaction(&self, product: &Product, quantity: i64) -> Transaction {
        let now = self.clock_now();
        let new_txn = NewTransaction {
            product_id: product.id,
            quantity,
            unit_price: product.price,
            base_fee: Cents::from(0),
            delivery_fee: Cents::from(0),
            total: product.price * quantity,
            customer: CustomerDetails { email: "ana@example.com".into(), full_name: "Ana Gómez".into() }.into(),
            delivery: DeliveryDetails { address: "Calle 10 # 5-51".into(), city: "Medellín".into(), phone: "3001234567".into() }
                .into(),
            reserved_until: now + ChronoDuration::minutes(15),
            created_at: now,
        };
        self.db.insert_pending_transaction(new_txn).await.expect("Error inserting transaction")
    }

    pub fn clock_now(&self) -> chrono::DateTime<chrono::Utc> {
        use checkout_engine::clock::Clock;
        self.clock.now()
    }

    pub async fn tear_down(mut self) {
        if let Err(e) = self.db.close().await {
            error!("🚀️ Failed to close database: {e}");
        }
        if let Err(e) = Sqlite::drop_database(&self.url).await {
            warn!("🚀️ Failed to drop database {}: {e}", self.url);
        }
    }
}
