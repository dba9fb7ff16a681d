//! Client tooling for the card payment gateway.
//!
//! * [`GatewayApi`] talks to the gateway's REST API (create and fetch transactions), with a bounded timeout and
//!   exponential-backoff retries on network errors, 5xx responses and rate limiting.
//! * [`helpers`] holds the signature math: the integrity signature attached to new transactions, and the event
//!   checksum the gateway puts on webhook deliveries.
mod api;
mod config;
mod data_objects;
mod error;

pub mod helpers;

pub use api::GatewayApi;
pub use config::GatewayConfig;
pub use data_objects::{ApiResponse, NewGatewayPayment, PaymentMethod, TransactionData, TransactionRequest};
pub use error::GatewayApiError;
