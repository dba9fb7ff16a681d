use serde::{Deserialize, Serialize};

use crate::db_types::Transaction;

/// A scheduled gateway status check. `attempt` counts from zero: attempt 0 is the first poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollJob {
    pub transaction_id: i64,
    pub attempt: u32,
}

impl PollJob {
    pub fn first(transaction_id: i64) -> Self {
        Self { transaction_id, attempt: 0 }
    }

    pub fn next(&self) -> Self {
        Self { transaction_id: self.transaction_id, attempt: self.attempt + 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollSkipReason {
    TransactionNotFound,
    AlreadyFinal,
    NoGatewayId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing to do. The job must not be re-queued.
    Skipped(PollSkipReason),
    /// The gateway reported a terminal status and the transaction was finalized (possibly by someone else first).
    Finalized(Transaction),
    /// Still pending at the gateway. Schedule this job after the re-queue delay.
    Requeue(PollJob),
    /// Still pending and the poll budget is spent. The transaction stays `Pending` until a webhook or the sweeper
    /// resolves it.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The event was not a transaction update.
    Ignored(String),
    /// No transaction carries the event's reference.
    UnknownReference(String),
    /// The gateway reported a non-terminal status. Nothing changed.
    StillPending(Transaction),
    /// The transaction was finalized. `applied` is false if it already was.
    Finalized { transaction: Transaction, applied: bool },
}

impl WebhookOutcome {
    pub fn describe(&self) -> String {
        match self {
            WebhookOutcome::Ignored(event) => format!("Event {event} ignored"),
            WebhookOutcome::UnknownReference(reference) => format!("No transaction with reference {reference}"),
            WebhookOutcome::StillPending(txn) => format!("Transaction {} is still pending", txn.reference),
            WebhookOutcome::Finalized { transaction, applied: true } => {
                format!("Transaction {} is now {}", transaction.reference, transaction.status)
            },
            WebhookOutcome::Finalized { transaction, applied: false } => {
                format!("Transaction {} was already {}", transaction.reference, transaction.status)
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationConfig {
    /// Re-polls allowed after the first poll.
    pub max_requeues: u32,
    pub verify_signatures: bool,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self { max_requeues: 5, verify_signatures: true }
    }
}

impl ReconciliationConfig {
    /// Total gateway status checks a single transaction can receive.
    pub fn total_polls(&self) -> u32 {
        self.max_requeues + 1
    }
}
