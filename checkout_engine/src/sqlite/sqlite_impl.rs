//! `SqliteDatabase` is the concrete storage backend of the checkout engine.
//!
//! Unsurprisingly, it uses SQLite and implements all the storage traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{customers, db_url, new_pool, products, transactions, webhook_events};
use crate::{
    db_types::{NewProduct, NewTransaction, NewWebhookEvent, Product, Transaction, TransactionStatus, WebhookEvent},
    traits::{
        CheckoutDatabase,
        CheckoutDatabaseError,
        FinalizeResult,
        InventoryError,
        InventoryManagement,
        StockEffect,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

fn check_quantity(quantity: i64) -> Result<(), InventoryError> {
    if quantity <= 0 {
        return Err(InventoryError::InvalidQuantity(quantity));
    }
    Ok(())
}

impl InventoryManagement for SqliteDatabase {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, InventoryError> {
        if product.stock_quantity < 0 {
            return Err(InventoryError::InvalidQuantity(product.stock_quantity));
        }
        let mut tx = self.pool.begin().await?;
        let product = products::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Product #{} ({}) added with {} units in stock", product.id, product.name, product.stock_quantity);
        Ok(product)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products(&mut conn).await?;
        Ok(products)
    }

    async fn reserve_stock(&self, product_id: i64, quantity: i64) -> Result<bool, InventoryError> {
        check_quantity(quantity)?;
        let mut conn = self.pool.acquire().await?;
        let reserved = products::reserve(product_id, quantity, &mut conn).await?;
        Ok(reserved)
    }

    async fn release_stock(&self, product_id: i64, quantity: i64) -> Result<bool, InventoryError> {
        check_quantity(quantity)?;
        let mut conn = self.pool.acquire().await?;
        let released = products::release(product_id, quantity, &mut conn).await?;
        Ok(released)
    }

    async fn commit_stock(&self, product_id: i64, quantity: i64) -> Result<bool, InventoryError> {
        check_quantity(quantity)?;
        let mut conn = self.pool.acquire().await?;
        let committed = products::commit(product_id, quantity, &mut conn).await?;
        Ok(committed)
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Takes a new checkout, and in a single atomic transaction,
    /// * stores the customer and the delivery details,
    /// * stores the transaction as `Pending`,
    /// * assigns it the reference `TXN-{id}`.
    async fn insert_pending_transaction(&self, transaction: NewTransaction) -> Result<Transaction, CheckoutDatabaseError> {
        let mut tx = self.pool.begin().await?;
        let now = transaction.created_at;
        let customer = customers::insert_customer(transaction.customer.clone(), now, &mut tx).await?;
        let delivery = customers::insert_delivery(transaction.delivery.clone(), now, &mut tx).await?;
        let txn = transactions::insert_pending(&transaction, customer.id, delivery.id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Transaction {txn} has been saved. Stock is held until {}", txn.reserved_until);
        Ok(txn)
    }

    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let txn = transactions::fetch_transaction(id, &mut conn).await?;
        Ok(txn)
    }

    async fn fetch_transaction_by_reference(&self, reference: &str) -> Result<Option<Transaction>, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let txn = transactions::fetch_transaction_by_reference(reference, &mut conn).await?;
        Ok(txn)
    }

    async fn record_gateway_txn_id(
        &self,
        id: i64,
        gateway_txn_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Transaction, CheckoutDatabaseError> {
        let mut tx = self.pool.begin().await?;
        if transactions::record_gateway_txn_id(id, gateway_txn_id, now, &mut tx).await? {
            trace!("🗃️ Gateway id {gateway_txn_id} recorded for transaction #{id}");
        }
        let txn =
            transactions::fetch_transaction(id, &mut tx).await?.ok_or(CheckoutDatabaseError::TransactionNotFound(id))?;
        tx.commit().await?;
        Ok(txn)
    }

    async fn finalize_transaction(
        &self,
        id: i64,
        status: TransactionStatus,
        gateway_txn_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<FinalizeResult, CheckoutDatabaseError> {
        if !status.is_final() {
            return Err(CheckoutDatabaseError::NonTerminalStatus(status));
        }
        let mut tx = self.pool.begin().await?;
        let updated = transactions::transition_from_pending(id, status, gateway_txn_id.as_deref(), now, &mut tx).await?;
        let Some(txn) = updated else {
            // Already terminal (or missing). The first terminal write won; at most fill in a missing gateway id.
            let existing =
                transactions::fetch_transaction(id, &mut tx).await?.ok_or(CheckoutDatabaseError::TransactionNotFound(id))?;
            let existing = match (gateway_txn_id.as_deref(), existing.gateway_txn_id.is_none()) {
                (Some(gateway_id), true) => {
                    transactions::record_gateway_txn_id(id, gateway_id, now, &mut tx).await?;
                    transactions::fetch_transaction(id, &mut tx).await?.unwrap_or(existing)
                },
                _ => existing,
            };
            tx.commit().await?;
            debug!("🗃️ Transaction {existing} is already final. Ignoring the request to set it to {status}");
            return Ok(FinalizeResult::duplicate(existing));
        };
        let (product_id, quantity) = (txn.product_id, txn.quantity);
        let (txn, effect) = if status == TransactionStatus::Approved {
            let effect = if products::commit(product_id, quantity, &mut tx).await? {
                StockEffect::Committed
            } else if products::deduct_unreserved(product_id, quantity, &mut tx).await? {
                StockEffect::CommittedWithoutReservation
            } else {
                StockEffect::CommitFailed
            };
            if effect == StockEffect::CommitFailed {
                error!(
                    "🗃️ Transaction {txn} was approved, but neither the reservation nor the free stock of product \
                     #{product_id} could cover {quantity} units. No stock was deducted. This needs manual attention."
                );
                (txn, effect)
            } else {
                let stamped = transactions::stamp_stock_committed(id, now, &mut tx).await?;
                (stamped.unwrap_or(txn), effect)
            }
        } else {
            let effect = if products::release(product_id, quantity, &mut tx).await? {
                StockEffect::Released
            } else {
                warn!(
                    "🗃️ Transaction {txn} is {status}, but product #{product_id} has fewer than {quantity} units \
                     reserved. Nothing was released."
                );
                StockEffect::NothingToRelease
            };
            let stamped = transactions::stamp_stock_released(id, now, &mut tx).await?;
            (stamped.unwrap_or(txn), effect)
        };
        tx.commit().await?;
        info!("🗃️ Transaction {txn} finalized. Stock effect: {effect:?}");
        Ok(FinalizeResult::applied(txn, effect))
    }

    async fn find_expired_pending_reservations(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let txns = transactions::expired_pending_reservations(now, &mut conn).await?;
        Ok(txns)
    }

    async fn insert_webhook_event(&self, event: NewWebhookEvent) -> Result<i64, CheckoutDatabaseError> {
        let mut tx = self.pool.begin().await?;
        let id = webhook_events::insert_webhook_event(event, &mut tx).await?;
        tx.commit().await?;
        trace!("🗃️ Webhook event #{id} recorded");
        Ok(id)
    }

    async fn fetch_recent_webhook_events(&self, limit: i64) -> Result<Vec<WebhookEvent>, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let events = webhook_events::fetch_recent_webhook_events(limit, &mut conn).await?;
        Ok(events)
    }

    async fn close(&mut self) -> Result<(), CheckoutDatabaseError> {
        self.pool.close().await;
        Ok(())
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. The migrations are embedded in the binary.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
