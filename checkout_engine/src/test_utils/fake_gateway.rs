use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use serde_json::Value;

use crate::{
    db_types::Cents,
    gateway_objects::{GatewayStatus, GatewayTransaction, NewGatewayTransaction},
    traits::{GatewayError, PaymentGateway},
};

pub const VALID_SIGNATURE: &str = "valid-test-signature";

#[derive(Debug, Default)]
struct FakeGatewayState {
    create_status: Option<GatewayStatus>,
    create_error: Option<GatewayError>,
    /// Answers for successive `fetch_transaction` calls. The last answer repeats once the script runs out.
    fetch_script: VecDeque<Result<GatewayStatus, GatewayError>>,
    created: Vec<NewGatewayTransaction>,
    fetch_calls: usize,
}

/// A scriptable, in-memory [`PaymentGateway`].
///
/// By default every payment is created `PENDING` and stays that way. Webhook signatures are valid iff they equal
/// [`VALID_SIGNATURE`].
#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<FakeGatewayState>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeGatewayState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The status the gateway answers with when a payment is created.
    pub fn create_with_status(&self, status: GatewayStatus) -> &Self {
        self.state().create_status = Some(status);
        self
    }

    /// Makes every `create_transaction` call fail.
    pub fn fail_creates_with(&self, error: GatewayError) -> &Self {
        self.state().create_error = Some(error);
        self
    }

    pub fn script_fetches<I: IntoIterator<Item = Result<GatewayStatus, GatewayError>>>(&self, script: I) -> &Self {
        self.state().fetch_script.extend(script);
        self
    }

    pub fn create_calls(&self) -> usize {
        self.state().created.len()
    }

    pub fn created(&self) -> Vec<NewGatewayTransaction> {
        self.state().created.clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.state().fetch_calls
    }

    pub fn gateway_id_for(reference: &str) -> String {
        format!("gw-{reference}")
    }
}

impl PaymentGateway for FakeGateway {
    async fn create_transaction(&self, transaction: NewGatewayTransaction) -> Result<GatewayTransaction, GatewayError> {
        let mut state = self.state();
        state.created.push(transaction.clone());
        if let Some(e) = state.create_error.clone() {
            return Err(e);
        }
        Ok(GatewayTransaction {
            id: Self::gateway_id_for(&transaction.reference),
            status: state.create_status.clone().unwrap_or(GatewayStatus::Pending),
            reference: transaction.reference,
            amount_in_cents: transaction.amount_in_cents,
        })
    }

    async fn fetch_transaction(&self, gateway_txn_id: &str) -> Result<GatewayTransaction, GatewayError> {
        let mut state = self.state();
        state.fetch_calls += 1;
        let answer = if state.fetch_script.len() > 1 {
            state.fetch_script.pop_front()
        } else {
            state.fetch_script.front().cloned()
        };
        let status = answer.unwrap_or(Ok(GatewayStatus::Pending))?;
        let reference = gateway_txn_id.strip_prefix("gw-").unwrap_or(gateway_txn_id).to_string();
        Ok(GatewayTransaction { id: gateway_txn_id.to_string(), status, reference, amount_in_cents: Cents::from(0) })
    }

    fn verify_webhook_signature(&self, _payload: &Value, signature: &str) -> bool {
        signature == VALID_SIGNATURE
    }
}
