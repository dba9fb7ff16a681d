use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use ckt_common::Cents;
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------   TransactionStatus   ---------------------------------------------------------
/// The lifecycle state of a purchase attempt.
///
/// `Pending` is the only non-terminal state. A transaction leaves `Pending` exactly once, through
/// `CheckoutDatabase::finalize_transaction`, and never changes status again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// Stock is reserved and the payment outcome is not known yet.
    Pending,
    /// Paid. The reserved stock has been permanently deducted.
    Approved,
    /// The payment was refused. The reservation has been released.
    Declined,
    /// The gateway reported an error (or a status we do not understand). The reservation has been released.
    Error,
    /// Cancelled or abandoned. The reservation has been released.
    Voided,
}

impl TransactionStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "PENDING"),
            TransactionStatus::Approved => write!(f, "APPROVED"),
            TransactionStatus::Declined => write!(f, "DECLINED"),
            TransactionStatus::Error => write!(f, "ERROR"),
            TransactionStatus::Voided => write!(f, "VOIDED"),
        }
    }
}

impl From<String> for TransactionStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid transaction status: {value}. But this conversion cannot fail. Defaulting to ERROR");
            TransactionStatus::Error
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid transaction status: {0}")]
pub struct ConversionError(String);

impl FromStr for TransactionStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "DECLINED" => Ok(Self::Declined),
            "ERROR" => Ok(Self::Error),
            "VOIDED" => Ok(Self::Voided),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------        Product        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Unit price
    pub price: Cents,
    /// Total units owned, including the ones earmarked by in-flight transactions.
    pub stock_quantity: i64,
    /// Units held by pending transactions.
    pub reserved_quantity: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Units that can still be reserved.
    pub fn available(&self) -> i64 {
        self.stock_quantity - self.reserved_quantity
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Cents,
    pub stock_quantity: i64,
    pub image_url: Option<String>,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Cents, stock_quantity: i64) -> Self {
        Self { name: name.into(), price, stock_quantity, ..Default::default() }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image_url<S: Into<String>>(mut self, url: S) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

//--------------------------------------   Customer & Delivery   -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Delivery {
    pub id: i64,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDelivery {
    pub address: String,
    pub city: String,
    pub phone: String,
}

//--------------------------------------      Transaction      ---------------------------------------------------------
/// One purchase attempt.
///
/// The commercial fields are fixed at creation. `stock_committed_at` and `stock_released_at` record the one-time
/// stock effect of finalization; at most one of them is ever set.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// `TXN-{id}`. This is the reference the payment gateway knows the transaction by.
    pub reference: String,
    pub product_id: i64,
    pub customer_id: i64,
    pub delivery_id: i64,
    pub quantity: i64,
    pub unit_price: Cents,
    pub base_fee: Cents,
    pub delivery_fee: Cents,
    pub total: Cents,
    pub status: TransactionStatus,
    pub gateway_txn_id: Option<String>,
    pub reserved_until: DateTime<Utc>,
    pub stock_committed_at: Option<DateTime<Utc>>,
    pub stock_released_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn reference_for_id(id: i64) -> String {
        format!("TXN-{id}")
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}x product #{} for {} ({})", self.reference, self.quantity, self.product_id, self.total, self.status)
    }
}

/// Everything needed to persist a freshly reserved checkout: the buyer, the delivery address and the priced
/// transaction. These are written together in one storage transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Cents,
    pub base_fee: Cents,
    pub delivery_fee: Cents,
    pub total: Cents,
    pub customer: NewCustomer,
    pub delivery: NewDelivery,
    pub reserved_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     WebhookEvent      ---------------------------------------------------------
/// An inbound webhook delivery, stored verbatim whether or not it could be verified.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: i64,
    pub event_type: Option<String>,
    pub payload: String,
    pub signature: Option<String>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWebhookEvent {
    pub event_type: Option<String>,
    pub payload: String,
    pub signature: Option<String>,
    pub received_at: DateTime<Utc>,
}
