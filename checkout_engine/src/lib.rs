//! Checkout Engine
//!
//! The checkout engine sells a finite stock of products to concurrent buyers through an external payment gateway,
//! without ever overselling and without losing stock to abandoned or failed payments.
//!
//! The library is divided into these main sections:
//! 1. The inventory ledger and transaction storage ([`traits`], with the SQLite backend in [`SqliteDatabase`]). Stock
//!    counters only ever change through single atomic conditional updates, and a transaction's status only ever
//!    changes through the idempotent finalize operation.
//! 2. The public API ([`mod@ckt_api`]): checkout, reconciliation (webhooks, status polls, the expiry sweep) and the
//!    catalog.
//!
//! The engine also emits events that the host application can subscribe to ([`events`]), e.g. whenever a transaction
//! has been finalized, or when a checkout needs its payment status polled later.
pub mod ckt_api;
pub mod clock;
pub mod db_types;
pub mod events;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use ckt_api::{
    catalog_api::CatalogApi,
    checkout_api::CheckoutApi,
    checkout_objects,
    errors::{CheckoutError, ReconciliationError},
    gateway_objects,
    reconciliation_api::ReconciliationApi,
    reconciliation_objects,
    transaction_flow_api::TransactionFlowApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db::db_url, SqliteDatabase};
