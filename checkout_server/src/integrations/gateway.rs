use checkout_engine::{
    db_types::Cents,
    gateway_objects::{GatewayStatus, GatewayTransaction, NewGatewayTransaction},
    traits::{GatewayError, PaymentGateway},
};
use gateway_tools::{GatewayApi, GatewayApiError, GatewayConfig, NewGatewayPayment, TransactionData};
use log::*;
use serde_json::Value;

/// The payment gateway port, backed by the gateway's REST API.
#[derive(Clone)]
pub struct GatewayClient {
    api: GatewayApi,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let api = GatewayApi::new(config).map_err(to_gateway_error)?;
        Ok(Self { api })
    }
}

impl PaymentGateway for GatewayClient {
    async fn create_transaction(&self, transaction: NewGatewayTransaction) -> Result<GatewayTransaction, GatewayError> {
        let payment = NewGatewayPayment {
            acceptance_token: transaction.acceptance_token,
            accept_personal_auth: transaction.accept_personal_auth.unwrap_or_default(),
            amount_in_cents: transaction.amount_in_cents.value(),
            reference: transaction.reference,
            payment_token: transaction.payment_token,
            installments: transaction.installments,
            customer_email: transaction.customer_email,
        };
        let data = self.api.create_transaction(payment).await.map_err(to_gateway_error)?;
        Ok(gateway_transaction(data))
    }

    async fn fetch_transaction(&self, gateway_txn_id: &str) -> Result<GatewayTransaction, GatewayError> {
        let data = self.api.fetch_transaction(gateway_txn_id).await.map_err(to_gateway_error)?;
        Ok(gateway_transaction(data))
    }

    fn verify_webhook_signature(&self, payload: &Value, signature: &str) -> bool {
        self.api.verify_event_checksum(payload, signature)
    }
}

fn gateway_transaction(data: TransactionData) -> GatewayTransaction {
    if let Some(msg) = &data.status_message {
        debug!("💳️ Gateway status message for {}: {msg}", data.reference);
    }
    GatewayTransaction {
        id: data.id,
        status: GatewayStatus::from(data.status),
        reference: data.reference,
        amount_in_cents: Cents::from(data.amount_in_cents),
    }
}

fn to_gateway_error(e: GatewayApiError) -> GatewayError {
    if e.is_retryable() {
        return GatewayError::Unavailable(e.to_string());
    }
    match e {
        GatewayApiError::JsonError(_) => GatewayError::InvalidResponse(e.to_string()),
        GatewayApiError::Initialization(_) | GatewayApiError::QueryError { .. } => GatewayError::Rejected(e.to_string()),
        GatewayApiError::RequestError(_) => GatewayError::Unavailable(e.to_string()),
    }
}
