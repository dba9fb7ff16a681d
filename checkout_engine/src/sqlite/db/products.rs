//! The inventory ledger.
//!
//! Every mutation here is one conditional `UPDATE`. The guard lives in the `WHERE` clause, so the check and the write
//! are a single atomic step and concurrent callers cannot both pass the same check. `rows_affected` tells the caller
//! whether the guard held.
use log::{trace, warn};
use sqlx::SqliteConnection;

use crate::db_types::{NewProduct, Product};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (name, description, price, stock_quantity, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.stock_quantity)
    .bind(product.image_url)
    .fetch_one(conn)
    .await?;
    Ok(product)
}

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products ORDER BY id").fetch_all(conn).await?;
    Ok(products)
}

/// `reserved_quantity += quantity`, iff at least `quantity` units are available.
pub async fn reserve(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE products
            SET reserved_quantity = reserved_quantity + $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND stock_quantity - reserved_quantity >= $1
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .execute(conn)
    .await?;
    let reserved = result.rows_affected() == 1;
    trace!("🗃️ Reserve {quantity} of product #{product_id}: {}", if reserved { "ok" } else { "refused" });
    Ok(reserved)
}

/// `reserved_quantity -= quantity`, iff at least `quantity` units are reserved.
pub async fn release(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE products
            SET reserved_quantity = reserved_quantity - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND reserved_quantity >= $1
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .execute(conn)
    .await?;
    let released = result.rows_affected() == 1;
    trace!("🗃️ Release {quantity} of product #{product_id}: {}", if released { "ok" } else { "refused" });
    Ok(released)
}

/// `stock_quantity -= quantity; reserved_quantity -= quantity`, iff both counters hold at least `quantity`.
pub async fn commit(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $1,
                reserved_quantity = reserved_quantity - $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND reserved_quantity >= $1 AND stock_quantity >= $1
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .execute(conn)
    .await?;
    let committed = result.rows_affected() == 1;
    trace!("🗃️ Commit {quantity} of product #{product_id}: {}", if committed { "ok" } else { "refused" });
    Ok(committed)
}

/// Compatibility path for transactions that never held a reservation: `stock_quantity -= quantity`, iff
/// `stock_quantity >= quantity`. The deduction may not eat into units reserved by other transactions, so
/// `reserved_quantity <= stock_quantity` still holds afterwards.
pub async fn deduct_unreserved(
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    warn!("🗃️ Deducting {quantity} of product #{product_id} without a reservation (legacy commit path)");
    let result = sqlx::query(
        r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND stock_quantity >= $1 AND stock_quantity - $1 >= reserved_quantity
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
