use std::collections::HashMap;

use checkout_engine::{
    checkout_objects::{CheckoutConfig, CheckoutRequest, CustomerDetails, DeliveryDetails},
    db_types::Cents,
    events::EventProducers,
    reconciliation_objects::ReconciliationConfig,
    test_utils::{prepare_env::prepare_fresh_database, FakeGateway, FixedClock},
    CheckoutApi,
    CheckoutError,
    ReconciliationApi,
    SqliteDatabase,
    TransactionFlowApi,
};
use cucumber::World;
use log::*;

#[derive(Default, Debug, World)]
pub struct CheckoutWorld {
    pub system: Option<CheckoutSystem>,
    /// Product ids by name
    pub products: HashMap<String, i64>,
    /// Transaction ids by the buyer's name
    pub transactions: HashMap<String, i64>,
    pub last_error: Option<CheckoutError>,
}

#[derive(Debug)]
pub struct CheckoutSystem {
    pub db_path: String,
    pub clock: FixedClock,
    pub gateway: FakeGateway,
    pub flow: TransactionFlowApi<SqliteDatabase>,
    pub checkout: CheckoutApi<SqliteDatabase, FakeGateway>,
    pub reconciliation: ReconciliationApi<SqliteDatabase, FakeGateway>,
}

impl CheckoutWorld {
    pub fn system(&self) -> &CheckoutSystem {
        self.system.as_ref().expect("Checkout system not initialised")
    }

    pub fn product_id(&self, name: &str) -> i64 {
        *self.products.get(name).unwrap_or_else(|| panic!("No product called {name}"))
    }

    pub fn transaction_id(&self, buyer: &str) -> i64 {
        *self.transactions.get(buyer).unwrap_or_else(|| panic!("{buyer} has not checked out"))
    }
}

impl CheckoutSystem {
    pub async fn new() -> Self {
        let db_path = prepare_fresh_database().await;
        let db = SqliteDatabase::new_with_url(&db_path, 5).await.expect("Error creating connection to database");
        debug!("Created database: {db_path}");
        let clock = FixedClock::default();
        let gateway = FakeGateway::new();
        let flow = TransactionFlowApi::new(db, EventProducers::default(), clock.shared());
        let checkout = CheckoutApi::new(flow.clone(), gateway.clone(), CheckoutConfig::default());
        let reconciliation = ReconciliationApi::new(flow.clone(), gateway.clone(), ReconciliationConfig::default());
        Self { db_path, clock, gateway, flow, checkout, reconciliation }
    }
}

pub fn request_for(buyer: &str, product_id: i64, quantity: i64) -> CheckoutRequest {
    CheckoutRequest {
        product_id,
        quantity,
        payment_token: format!("tok_{buyer}"),
        acceptance_token: "acc_test".into(),
        accept_personal_auth: None,
        installments: 1,
        customer: CustomerDetails { email: format!("{}@example.com", buyer.to_lowercase()), full_name: buyer.into() },
        delivery: DeliveryDetails { address: "Carrera 7 # 71-21".into(), city: "Bogotá".into(), phone: "3109876543".into() },
    }
}

pub fn cop(pesos: i64) -> Cents {
    Cents::from(pesos * 100)
}
