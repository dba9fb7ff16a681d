use serde_json::Value;
use thiserror::Error;

use crate::ckt_api::gateway_objects::{GatewayTransaction, NewGatewayTransaction};

/// The port to the external payment processor.
///
/// Implementations own the transport, authentication and signature math. The engine only ever sees the gateway's
/// answers through [`GatewayTransaction`].
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone {
    /// Starts a payment for the given reference.
    async fn create_transaction(&self, transaction: NewGatewayTransaction) -> Result<GatewayTransaction, GatewayError>;

    /// Asks the gateway for the current state of a payment it created earlier.
    async fn fetch_transaction(&self, gateway_txn_id: &str) -> Result<GatewayTransaction, GatewayError>;

    /// Checks the signature that accompanies a webhook event.
    fn verify_webhook_signature(&self, payload: &Value, signature: &str) -> bool;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway could not be reached. {0}")]
    Unavailable(String),
    #[error("The payment gateway rejected the request. {0}")]
    Rejected(String),
    #[error("The payment gateway sent a response we could not understand. {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Whether repeating the same call later could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Unavailable(_))
    }
}
