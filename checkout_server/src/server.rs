use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use checkout_engine::{
    clock::SystemClock,
    events::EventProducers,
    CatalogApi,
    CheckoutApi,
    ReconciliationApi,
    SqliteDatabase,
    TransactionFlowApi,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use tokio::sync::mpsc;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    integrations::{gateway::GatewayClient, hooks::create_event_handlers},
    poll_worker::start_poll_worker,
    routes::{health, CheckoutRoute, GatewayWebhookRoute, ProductByIdRoute, ProductsRoute, TransactionByIdRoute},
};

const POLL_QUEUE_SIZE: usize = 256;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = prepare_database(&config.database_url).await?;
    let gateway = GatewayClient::new(config.gateway.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let (poll_tx, poll_rx) = mpsc::channel(POLL_QUEUE_SIZE);
    let handlers = create_event_handlers(poll_tx);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let flow_api = TransactionFlowApi::new(db.clone(), producers.clone(), SystemClock::shared());
    let reconciliation_api = ReconciliationApi::new(flow_api.clone(), gateway.clone(), config.reconciliation_config());
    // Background workers
    let _poll_worker = start_poll_worker(reconciliation_api, config.poll, poll_rx);
    let _expiry_worker = start_expiry_worker(flow_api, config.sweep_interval);
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::BackendError(e.to_string()))
}

/// Creates the database if it does not exist yet and brings its schema up to date.
pub async fn prepare_database(url: &str) -> Result<SqliteDatabase, ServerError> {
    let exists = Sqlite::database_exists(url).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if !exists {
        info!("🚀️ Creating database at {url}");
        Sqlite::create_database(url).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let db = SqliteDatabase::new_with_url(url, 25).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    info!("🚀️ Database is ready");
    Ok(db)
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: GatewayClient,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let checkout_config = config.checkout;
    let reconciliation_config = config.reconciliation_config();
    let srv = HttpServer::new(move || {
        let flow_api = TransactionFlowApi::new(db.clone(), producers.clone(), SystemClock::shared());
        let catalog_api = CatalogApi::new(db.clone());
        let checkout_api = CheckoutApi::new(flow_api.clone(), gateway.clone(), checkout_config);
        let reconciliation_api = ReconciliationApi::new(flow_api.clone(), gateway.clone(), reconciliation_config);
        let api_scope = web::scope("/api")
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new())
            .service(CheckoutRoute::<SqliteDatabase, GatewayClient>::new())
            .service(TransactionByIdRoute::<SqliteDatabase>::new())
            .service(GatewayWebhookRoute::<SqliteDatabase, GatewayClient>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ckt::access_log"))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(reconciliation_api))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
