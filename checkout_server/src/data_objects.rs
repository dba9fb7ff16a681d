use std::fmt::Display;

use checkout_engine::db_types::{Cents, Product, Transaction, TransactionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The public view of a product. Stock counters are collapsed into the number of units that can still be bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Cents,
    pub available: i64,
    pub image_url: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        let available = p.available();
        Self { id: p.id, name: p.name, description: p.description, price: p.price, available, image_url: p.image_url }
    }
}

/// The status of a purchase, as the buyer's browser sees it while it waits for the payment to settle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub reference: String,
    pub product_id: i64,
    pub quantity: i64,
    pub total: Cents,
    pub status: TransactionStatus,
    pub reserved_until: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            reference: t.reference,
            product_id: t.product_id,
            quantity: t.quantity,
            total: t.total,
            status: t.status,
            reserved_until: t.reserved_until,
            updated_at: t.updated_at,
        }
    }
}
