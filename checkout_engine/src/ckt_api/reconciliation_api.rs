//! Reconciliation brings the local view of a transaction in line with the gateway's.
//!
//! Two independent producers feed it: webhook events pushed by the gateway, and status polls scheduled after checkout.
//! Either may arrive first, late, or more than once. Both end in the same idempotent finalize, so the first terminal
//! status to arrive wins and every later one is a no-op.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use serde_json::Value;

use crate::{
    ckt_api::{
        errors::ReconciliationError,
        gateway_objects::{GatewayEvent, TRANSACTION_UPDATED_EVENT},
        reconciliation_objects::{PollJob, PollOutcome, PollSkipReason, ReconciliationConfig, WebhookOutcome},
        transaction_flow_api::TransactionFlowApi,
    },
    db_types::{NewWebhookEvent, TransactionStatus},
    traits::{CheckoutDatabase, CheckoutDatabaseError, PaymentGateway, SweepResult},
};

pub struct ReconciliationApi<B, G> {
    flow: TransactionFlowApi<B>,
    gateway: G,
    config: ReconciliationConfig,
}

impl<B, G> Debug for ReconciliationApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi ({:?})", self.config)
    }
}

impl<B, G> ReconciliationApi<B, G> {
    pub fn new(flow: TransactionFlowApi<B>, gateway: G, config: ReconciliationConfig) -> Self {
        Self { flow, gateway, config }
    }

    pub fn flow(&self) -> &TransactionFlowApi<B> {
        &self.flow
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }
}

impl<B, G> ReconciliationApi<B, G>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
{
    /// Processes one webhook delivery.
    ///
    /// The raw body is stored in the audit log before anything else, including deliveries that then fail signature
    /// verification. An unverified event never changes a transaction.
    pub async fn handle_webhook(
        &self,
        body: &str,
        signature: Option<&str>,
    ) -> Result<WebhookOutcome, ReconciliationError> {
        let payload = serde_json::from_str::<Value>(body).ok();
        let event_type = payload.as_ref().and_then(|v| v.get("event")).and_then(Value::as_str).map(String::from);
        let audit = NewWebhookEvent {
            event_type: event_type.clone(),
            payload: body.to_string(),
            signature: signature.map(String::from),
            received_at: self.flow.now(),
        };
        let audit_id = self.flow.db().insert_webhook_event(audit).await?;
        trace!("🪝️ Webhook delivery recorded as event #{audit_id}");

        let payload = payload.ok_or_else(|| ReconciliationError::InvalidPayload("Body is not valid JSON".into()))?;
        if self.config.verify_signatures {
            let signature = signature.ok_or_else(|| {
                warn!("🪝️ Webhook event #{audit_id} has no signature. Rejecting it.");
                ReconciliationError::Unauthorized
            })?;
            if !self.gateway.verify_webhook_signature(&payload, signature) {
                warn!("🪝️ Webhook event #{audit_id} has an invalid signature. Rejecting it.");
                return Err(ReconciliationError::Unauthorized);
            }
        }
        let event_type = event_type.unwrap_or_default();
        if event_type != TRANSACTION_UPDATED_EVENT {
            debug!("🪝️ Ignoring webhook event of type '{event_type}'");
            return Ok(WebhookOutcome::Ignored(event_type));
        }
        let event: GatewayEvent =
            serde_json::from_value(payload).map_err(|e| ReconciliationError::InvalidPayload(e.to_string()))?;
        let reference = event.data.transaction.reference.clone();
        let Some(txn) = self.flow.db().fetch_transaction_by_reference(&reference).await? else {
            warn!("🪝️ Webhook refers to {reference}, which we know nothing about. Acknowledging and moving on.");
            return Ok(WebhookOutcome::UnknownReference(reference));
        };
        let gateway_status = event.status();
        let status = TransactionStatus::from(gateway_status.clone());
        if !status.is_final() {
            debug!("🪝️ Gateway says {reference} is {gateway_status}. Nothing to do yet.");
            return Ok(WebhookOutcome::StillPending(txn));
        }
        info!("🪝️ Gateway says {reference} is {gateway_status}");
        let result = self.flow.finalize(txn.id, status, Some(event.data.transaction.id)).await?;
        Ok(WebhookOutcome::Finalized { transaction: result.transaction, applied: result.applied })
    }

    /// Runs one scheduled status check.
    ///
    /// Gateway failures are returned as errors so that the scheduler can retry the same attempt. They do not count
    /// against the poll budget.
    pub async fn poll_transaction(&self, job: PollJob) -> Result<PollOutcome, ReconciliationError> {
        let id = job.transaction_id;
        let Some(txn) = self.flow.fetch_transaction(id).await? else {
            warn!("🔁️ Poll for transaction #{id} skipped. It does not exist.");
            return Ok(PollOutcome::Skipped(PollSkipReason::TransactionNotFound));
        };
        if txn.status.is_final() {
            debug!("🔁️ Poll for {} skipped. It is already {}.", txn.reference, txn.status);
            return Ok(PollOutcome::Skipped(PollSkipReason::AlreadyFinal));
        }
        let Some(gateway_id) = txn.gateway_txn_id.clone() else {
            warn!("🔁️ Poll for {} skipped. The gateway never acknowledged it.", txn.reference);
            return Ok(PollOutcome::Skipped(PollSkipReason::NoGatewayId));
        };
        let gateway_txn = self.gateway.fetch_transaction(&gateway_id).await?;
        let status = TransactionStatus::from(gateway_txn.status.clone());
        trace!("🔁️ Poll {}/{} for {}: {}", job.attempt + 1, self.config.total_polls(), txn.reference, gateway_txn.status);
        if status.is_final() {
            let result = self.flow.finalize(id, status, Some(gateway_id)).await?;
            return Ok(PollOutcome::Finalized(result.transaction));
        }
        if job.attempt < self.config.max_requeues {
            Ok(PollOutcome::Requeue(job.next()))
        } else {
            info!(
                "🔁️ {} is still pending after {} polls. Leaving it to the webhook or the expiry sweep.",
                txn.reference,
                job.attempt + 1
            );
            Ok(PollOutcome::Exhausted)
        }
    }

    pub async fn sweep_expired_reservations(&self, now: DateTime<Utc>) -> Result<SweepResult, CheckoutDatabaseError> {
        self.flow.sweep_expired_reservations(now).await
    }
}
