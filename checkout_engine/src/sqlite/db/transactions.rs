use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{NewTransaction, Transaction, TransactionStatus};

/// Inserts a `Pending` transaction row and assigns it the reference `TXN-{id}`.
///
/// The customer and delivery rows must already exist. Call this inside a storage transaction so that the row is never
/// observable without its reference.
pub async fn insert_pending(
    txn: &NewTransaction,
    customer_id: i64,
    delivery_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Transaction, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO transactions (
                product_id, customer_id, delivery_id, quantity, unit_price, base_fee, delivery_fee, total, status,
                reserved_until, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'PENDING', $9, $10, $10)
            RETURNING id;
        "#,
    )
    .bind(txn.product_id)
    .bind(customer_id)
    .bind(delivery_id)
    .bind(txn.quantity)
    .bind(txn.unit_price)
    .bind(txn.base_fee)
    .bind(txn.delivery_fee)
    .bind(txn.total)
    .bind(txn.reserved_until)
    .bind(txn.created_at)
    .fetch_one(&mut *conn)
    .await?;
    let transaction = sqlx::query_as("UPDATE transactions SET reference = $1 WHERE id = $2 RETURNING *")
        .bind(Transaction::reference_for_id(id))
        .bind(id)
        .fetch_one(conn)
        .await?;
    trace!("🗃️ Transaction #{id} inserted");
    Ok(transaction)
}

pub async fn fetch_transaction(id: i64, conn: &mut SqliteConnection) -> Result<Option<Transaction>, sqlx::Error> {
    let txn = sqlx::query_as("SELECT * FROM transactions WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(txn)
}

pub async fn fetch_transaction_by_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    let txn =
        sqlx::query_as("SELECT * FROM transactions WHERE reference = $1").bind(reference).fetch_optional(conn).await?;
    Ok(txn)
}

/// The compare-and-set at the heart of finalization: moves the transaction to `status` iff it is still `Pending`.
///
/// A gateway id, if given, is stored at the same time unless one is already known. Returns `None` if the transaction
/// does not exist or has already left `Pending`.
pub async fn transition_from_pending(
    id: i64,
    status: TransactionStatus,
    gateway_txn_id: Option<&str>,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    let txn = sqlx::query_as(
        r#"
            UPDATE transactions
            SET status = $1, gateway_txn_id = COALESCE(gateway_txn_id, $2), updated_at = $3
            WHERE id = $4 AND status = 'PENDING'
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(gateway_txn_id)
    .bind(now)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(txn)
}

/// Stores the gateway id iff none is stored yet. Returns `true` if the row was updated.
pub async fn record_gateway_txn_id(
    id: i64,
    gateway_txn_id: &str,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE transactions SET gateway_txn_id = $1, updated_at = $2 WHERE id = $3 AND gateway_txn_id IS NULL",
    )
    .bind(gateway_txn_id)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn stamp_stock_committed(
    id: i64,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    let txn = sqlx::query_as(
        r#"
            UPDATE transactions SET stock_committed_at = $1, updated_at = $1
            WHERE id = $2 AND stock_committed_at IS NULL AND stock_released_at IS NULL
            RETURNING *;
        "#,
    )
    .bind(now)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(txn)
}

pub async fn stamp_stock_released(
    id: i64,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    let txn = sqlx::query_as(
        r#"
            UPDATE transactions SET stock_released_at = $1, updated_at = $1
            WHERE id = $2 AND stock_committed_at IS NULL AND stock_released_at IS NULL
            RETURNING *;
        "#,
    )
    .bind(now)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(txn)
}

/// `Pending` transactions whose hold expired strictly before `now`, and that have had no stock effect yet. Oldest
/// first.
pub async fn expired_pending_reservations(
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let txns = sqlx::query_as(
        r#"
            SELECT * FROM transactions
            WHERE status = 'PENDING'
              AND reserved_until < $1
              AND stock_committed_at IS NULL
              AND stock_released_at IS NULL
            ORDER BY reserved_until, id;
        "#,
    )
    .bind(now)
    .fetch_all(conn)
    .await?;
    Ok(txns)
}
