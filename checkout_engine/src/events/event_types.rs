use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ckt_api::reconciliation_objects::PollJob,
    db_types::{Transaction, TransactionStatus},
};

/// Emitted whenever a finalization request has been processed, whether or not it changed anything. Subscribers
/// must treat it as advisory: the same update can arrive more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionUpdatedEvent {
    pub transaction_id: i64,
    pub reference: String,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}

impl TransactionUpdatedEvent {
    pub fn new(transaction: &Transaction, timestamp: DateTime<Utc>) -> Self {
        Self {
            transaction_id: transaction.id,
            reference: transaction.reference.clone(),
            status: transaction.status,
            timestamp,
        }
    }
}

/// A request to check a transaction's status with the gateway later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollRequestedEvent {
    pub job: PollJob,
}

impl PollRequestedEvent {
    pub fn new(job: PollJob) -> Self {
        Self { job }
    }
}
