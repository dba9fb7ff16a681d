use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::{Cents, TransactionStatus};

/// The name of the only webhook event the engine acts on.
pub const TRANSACTION_UPDATED_EVENT: &str = "transaction.updated";

//--------------------------------------     GatewayStatus     ---------------------------------------------------------
/// A payment status as reported by the gateway.
///
/// The gateway's vocabulary is open-ended, so anything we do not recognise is kept verbatim in `Unknown` and treated as
/// an error when it is mapped onto a [`TransactionStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GatewayStatus {
    Pending,
    Approved,
    Declined,
    Error,
    Voided,
    Unknown(String),
}

impl From<&str> for GatewayStatus {
    fn from(value: &str) -> Self {
        match value {
            "PENDING" => Self::Pending,
            "APPROVED" => Self::Approved,
            "DECLINED" => Self::Declined,
            "ERROR" => Self::Error,
            "VOIDED" => Self::Voided,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for GatewayStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<GatewayStatus> for TransactionStatus {
    fn from(status: GatewayStatus) -> Self {
        match status {
            GatewayStatus::Pending => TransactionStatus::Pending,
            GatewayStatus::Approved => TransactionStatus::Approved,
            GatewayStatus::Declined => TransactionStatus::Declined,
            GatewayStatus::Error | GatewayStatus::Unknown(_) => TransactionStatus::Error,
            GatewayStatus::Voided => TransactionStatus::Voided,
        }
    }
}

impl Display for GatewayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayStatus::Pending => write!(f, "PENDING"),
            GatewayStatus::Approved => write!(f, "APPROVED"),
            GatewayStatus::Declined => write!(f, "DECLINED"),
            GatewayStatus::Error => write!(f, "ERROR"),
            GatewayStatus::Voided => write!(f, "VOIDED"),
            GatewayStatus::Unknown(s) => write!(f, "{s} (unrecognised)"),
        }
    }
}

//--------------------------------------  Gateway transactions ---------------------------------------------------------
/// The engine's request to start a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGatewayTransaction {
    pub acceptance_token: String,
    pub accept_personal_auth: Option<String>,
    pub amount_in_cents: Cents,
    pub reference: String,
    pub payment_token: String,
    pub installments: u32,
    pub customer_email: String,
}

/// The gateway's view of a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayTransaction {
    pub id: String,
    pub status: GatewayStatus,
    pub reference: String,
    pub amount_in_cents: Cents,
}

//--------------------------------------     Webhook events    ---------------------------------------------------------
/// An event notification pushed by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayEvent {
    pub event: String,
    pub data: GatewayEventData,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayEventData {
    pub transaction: GatewayEventTransaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayEventTransaction {
    pub id: String,
    pub reference: String,
    pub status: String,
    #[serde(default)]
    pub amount_in_cents: Option<i64>,
}

impl GatewayEvent {
    pub fn is_transaction_update(&self) -> bool {
        self.event == TRANSACTION_UPDATED_EVENT
    }

    pub fn status(&self) -> GatewayStatus {
        GatewayStatus::from(self.data.transaction.status.as_str())
    }
}
