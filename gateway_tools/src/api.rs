use std::sync::Arc;

use ckt_common::CHECKOUT_CURRENCY_CODE;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::GatewayConfig,
    data_objects::{ApiResponse, ErrorResponse, NewGatewayPayment, PaymentMethod, TransactionData, TransactionRequest},
    helpers::{integrity_signature, retry_delay, verify_event_checksum},
    GatewayApiError,
};

#[derive(Clone)]
pub struct GatewayApi {
    config: GatewayConfig,
    client: Arc<Client>,
}

impl GatewayApi {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.private_key.reveal()))
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Starts a card payment. The request is signed with the integrity secret and always charged in
    /// [`CHECKOUT_CURRENCY_CODE`].
    pub async fn create_transaction(&self, payment: NewGatewayPayment) -> Result<TransactionData, GatewayApiError> {
        let signature = integrity_signature(
            &payment.reference,
            payment.amount_in_cents,
            CHECKOUT_CURRENCY_CODE,
            self.config.integrity_secret.reveal(),
        );
        let body = TransactionRequest {
            acceptance_token: payment.acceptance_token,
            accept_personal_auth: payment.accept_personal_auth,
            amount_in_cents: payment.amount_in_cents,
            currency: CHECKOUT_CURRENCY_CODE.to_string(),
            signature,
            customer_email: payment.customer_email,
            reference: payment.reference,
            payment_method: PaymentMethod {
                method_type: "CARD".to_string(),
                token: payment.payment_token,
                installments: payment.installments.max(1),
            },
        };
        debug!("💳️ Creating gateway transaction for {}", body.reference);
        let response: ApiResponse<TransactionData> =
            self.rest_query(Method::POST, "/transactions", Some(&body)).await?;
        info!("💳️ Gateway transaction {} created for {} ({})", response.data.id, body.reference, response.data.status);
        Ok(response.data)
    }

    pub async fn fetch_transaction(&self, gateway_txn_id: &str) -> Result<TransactionData, GatewayApiError> {
        let path = format!("/transactions/{gateway_txn_id}");
        let response: ApiResponse<TransactionData> = self.rest_query::<_, ()>(Method::GET, &path, None).await?;
        trace!("💳️ Gateway reports transaction {gateway_txn_id} as {}", response.data.status);
        Ok(response.data)
    }

    /// Verifies the checksum that accompanies a webhook event, using the configured events key.
    pub fn verify_event_checksum(&self, payload: &Value, checksum: &str) -> bool {
        verify_event_checksum(payload, checksum, self.config.events_key.reveal())
    }

    /// Sends a request, retrying up to `max_retries` times with exponential backoff when the failure is retryable.
    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, GatewayApiError> {
        let mut retry = 0;
        loop {
            match self.send_once(method.clone(), path, body).await {
                Err(e) if e.is_retryable() && retry < self.config.max_retries => {
                    let delay = retry_delay(retry);
                    retry += 1;
                    warn!("💳️ {method} {path} failed ({e}). Retry {retry}/{} in {delay:?}", self.config.max_retries);
                    tokio::time::sleep(delay).await;
                },
                result => return result,
            }
        }
    }

    async fn send_once<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, GatewayApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let response = req.send().await.map_err(|e| GatewayApiError::RequestError(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            trace!("💳️ REST query successful. {status}");
            response.json::<T>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))
        } else {
            let text = response.text().await.map_err(|e| GatewayApiError::RequestError(e.to_string()))?;
            let message = serde_json::from_str::<ErrorResponse>(&text).map(|r| r.error.describe()).unwrap_or(text);
            Err(GatewayApiError::QueryError { status: status.as_u16(), message })
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }
}
