//! # Checkout engine public API
//!
//! The `ckt_api` module exposes the programmatic API of the checkout engine.
//!
//! * [`checkout_api`] reserves stock, persists the transaction and starts the payment.
//! * [`reconciliation_api`] handles webhook deliveries and status polls, and sweeps expired reservations.
//! * [`transaction_flow_api`] is the shared chokepoint for finalizing transactions and notifying subscribers.
//! * [`catalog_api`] provides read access to the product catalog.
//!
//! The other submodules are support types.
//!
//! # API usage
//!
//! Every API is created by supplying a backend that implements the storage traits it needs, and where applicable a
//! [`crate::traits::PaymentGateway`] implementation:
//!
//! ```rust,ignore
//! let db = SqliteDatabase::new_with_url(url, 5).await?;
//! let flow = TransactionFlowApi::new(db, producers, SystemClock::shared());
//! let api = ReconciliationApi::new(flow, gateway, ReconciliationConfig::default());
//! let outcome = api.poll_transaction(PollJob::first(42)).await?;
//! ```
pub mod catalog_api;
pub mod checkout_api;
pub mod checkout_objects;
pub mod errors;
pub mod gateway_objects;
pub mod reconciliation_api;
pub mod reconciliation_objects;
pub mod transaction_flow_api;
