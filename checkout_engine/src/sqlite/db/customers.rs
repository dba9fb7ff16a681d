use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{Customer, Delivery, NewCustomer, NewDelivery};

pub async fn insert_customer(
    customer: NewCustomer,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Customer, sqlx::Error> {
    let customer = sqlx::query_as("INSERT INTO customers (email, full_name, created_at) VALUES ($1, $2, $3) RETURNING *")
        .bind(customer.email)
        .bind(customer.full_name)
        .bind(now)
        .fetch_one(conn)
        .await?;
    Ok(customer)
}

pub async fn insert_delivery(
    delivery: NewDelivery,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Delivery, sqlx::Error> {
    let delivery = sqlx::query_as(
        "INSERT INTO deliveries (address, city, phone, created_at) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(delivery.address)
    .bind(delivery.city)
    .bind(delivery.phone)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(delivery)
}
