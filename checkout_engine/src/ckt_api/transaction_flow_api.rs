use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    ckt_api::reconciliation_objects::PollJob,
    clock::SharedClock,
    db_types::{Transaction, TransactionStatus},
    events::{EventProducers, PollRequestedEvent, TransactionUpdatedEvent},
    traits::{CheckoutDatabase, CheckoutDatabaseError, FinalizeResult, SweepResult},
};

/// `TransactionFlowApi` drives transactions to their terminal state and tells the rest of the system about it.
///
/// Every status change in the engine goes through [`Self::finalize`], whichever path (checkout, webhook, poll or
/// sweep) triggered it.
#[derive(Clone)]
pub struct TransactionFlowApi<B> {
    db: B,
    producers: EventProducers,
    clock: SharedClock,
}

impl<B> Debug for TransactionFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransactionFlowApi")
    }
}

impl<B> TransactionFlowApi<B> {
    pub fn new(db: B, producers: EventProducers, clock: SharedClock) -> Self {
        Self { db, producers, clock }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn notify_transaction_updated(&self, transaction: &Transaction) {
        let event = TransactionUpdatedEvent::new(transaction, self.now());
        for emitter in &self.producers.transaction_updated_producer {
            trace!("🔄️📣️ Notifying subscribers that {} is {}", transaction.reference, transaction.status);
            emitter.publish_event(event.clone());
        }
    }

    pub fn request_poll(&self, job: PollJob) {
        if self.producers.poll_requested_producer.is_empty() {
            debug!("🔄️ No poll scheduler is listening. Transaction #{} will not be polled.", job.transaction_id);
        }
        for emitter in &self.producers.poll_requested_producer {
            emitter.publish_event(PollRequestedEvent::new(job));
        }
    }
}

impl<B> TransactionFlowApi<B>
where B: CheckoutDatabase
{
    pub async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, CheckoutDatabaseError> {
        self.db.fetch_transaction(id).await
    }

    /// Finalizes the transaction and notifies subscribers with the stored result.
    ///
    /// Subscribers are notified on duplicate calls too, with the status that is actually stored.
    pub async fn finalize(
        &self,
        id: i64,
        status: TransactionStatus,
        gateway_txn_id: Option<String>,
    ) -> Result<FinalizeResult, CheckoutDatabaseError> {
        let result = self.db.finalize_transaction(id, status, gateway_txn_id, self.now()).await?;
        if result.applied {
            debug!("🔄️ Transaction {} moved to {}", result.transaction.reference, result.transaction.status);
        } else {
            debug!(
                "🔄️ Transaction {} was already {}. Request for {status} had no effect.",
                result.transaction.reference, result.transaction.status
            );
        }
        self.notify_transaction_updated(&result.transaction);
        Ok(result)
    }

    /// Voids every pending transaction whose hold expired before `now`, releasing its stock.
    ///
    /// A failure on one transaction is recorded in the result and does not stop the sweep.
    pub async fn sweep_expired_reservations(&self, now: DateTime<Utc>) -> Result<SweepResult, CheckoutDatabaseError> {
        let expired = self.db.find_expired_pending_reservations(now).await?;
        let mut result = SweepResult::default();
        if expired.is_empty() {
            trace!("🕰️ No expired reservations");
            return Ok(result);
        }
        info!("🕰️ {} reservations have expired", expired.len());
        for txn in expired {
            match self.finalize(txn.id, TransactionStatus::Voided, None).await {
                Ok(r) if r.applied => result.voided.push(r.transaction),
                Ok(r) => result.already_final.push(r.transaction),
                Err(e) => {
                    error!("🕰️ Could not void expired transaction {}: {e}", txn.reference);
                    result.failures.push((txn.id, e.to_string()));
                },
            }
        }
        Ok(result)
    }
}
