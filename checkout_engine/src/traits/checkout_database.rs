use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{NewTransaction, NewWebhookEvent, Transaction, TransactionStatus, WebhookEvent},
    traits::{data_objects::FinalizeResult, InventoryError, InventoryManagement},
};

/// This trait defines the storage behaviour behind the checkout engine.
///
/// This behaviour includes:
/// * Persisting new checkouts (customer, delivery and a `Pending` transaction) atomically.
/// * Looking transactions up by id and by their gateway-facing reference.
/// * Finalizing transactions. This is the only way a transaction can leave `Pending`, and the only way the reserved
///   counter of the inventory ledger is touched after checkout.
/// * Keeping an audit trail of inbound webhook events.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase: Clone + InventoryManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores the customer, the delivery details and a `Pending` transaction in a single atomic transaction, and
    /// assigns the transaction its `TXN-{id}` reference. Stock must already have been reserved by the caller.
    async fn insert_pending_transaction(&self, transaction: NewTransaction) -> Result<Transaction, CheckoutDatabaseError>;

    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, CheckoutDatabaseError>;

    async fn fetch_transaction_by_reference(&self, reference: &str) -> Result<Option<Transaction>, CheckoutDatabaseError>;

    /// Records the gateway's id for the transaction, if none has been recorded yet. An id that is already set is
    /// never overwritten. Returns the (possibly unchanged) transaction.
    async fn record_gateway_txn_id(
        &self,
        id: i64,
        gateway_txn_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Transaction, CheckoutDatabaseError>;

    /// Moves a `Pending` transaction to the terminal `status` and applies its one-time stock effect, all inside one
    /// storage transaction:
    /// * `Approved`: commit the reserved units (falling back to a plain stock deduction for transactions that hold no
    ///   reservation) and stamp `stock_committed_at`.
    /// * any other terminal status: release the reservation and stamp `stock_released_at`.
    ///
    /// The call is idempotent. If the transaction is already terminal, the stock is not touched again and the stored
    /// record is returned with `applied == false`; the only possible change is recording a gateway id that was not
    /// known before. The first terminal write wins.
    async fn finalize_transaction(
        &self,
        id: i64,
        status: TransactionStatus,
        gateway_txn_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<FinalizeResult, CheckoutDatabaseError>;

    /// All `Pending` transactions whose reservation ran out before `now` and that have neither committed nor
    /// released their stock.
    async fn find_expired_pending_reservations(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, CheckoutDatabaseError>;

    /// Appends an inbound webhook delivery to the audit log. Returns the id of the new record.
    async fn insert_webhook_event(&self, event: NewWebhookEvent) -> Result<i64, CheckoutDatabaseError>;

    /// The most recent `limit` webhook events, newest first.
    async fn fetch_recent_webhook_events(&self, limit: i64) -> Result<Vec<WebhookEvent>, CheckoutDatabaseError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), CheckoutDatabaseError>;
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutDatabaseError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Inventory error. {0}")]
    InventoryError(#[from] InventoryError),
    #[error("The requested transaction (internal id {0}) does not exist")]
    TransactionNotFound(i64),
    #[error("Transactions can only be finalized with a terminal status, not {0}")]
    NonTerminalStatus(TransactionStatus),
}

impl From<sqlx::Error> for CheckoutDatabaseError {
    fn from(e: sqlx::Error) -> Self {
        CheckoutDatabaseError::DatabaseError(e.to_string())
    }
}
