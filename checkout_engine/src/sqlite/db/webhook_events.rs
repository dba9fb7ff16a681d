use sqlx::SqliteConnection;

use crate::db_types::{NewWebhookEvent, WebhookEvent};

pub async fn insert_webhook_event(event: NewWebhookEvent, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let id = sqlx::query_scalar(
        r#"
            INSERT INTO webhook_events (event_type, payload, signature, received_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id;
        "#,
    )
    .bind(event.event_type)
    .bind(event.payload)
    .bind(event.signature)
    .bind(event.received_at)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// The most recent `limit` events, newest first.
pub async fn fetch_recent_webhook_events(limit: i64, conn: &mut SqliteConnection) -> Result<Vec<WebhookEvent>, sqlx::Error> {
    let events = sqlx::query_as("SELECT * FROM webhook_events ORDER BY id DESC LIMIT $1")
        .bind(limit)
        .fetch_all(conn)
        .await?;
    Ok(events)
}
