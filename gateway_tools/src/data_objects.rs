use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The merchant-side description of a card payment, before it is signed and sent to the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGatewayPayment {
    pub acceptance_token: String,
    pub accept_personal_auth: String,
    pub amount_in_cents: i64,
    pub reference: String,
    pub payment_token: String,
    pub installments: u32,
    pub customer_email: String,
}

/// The wire body of `POST /transactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub acceptance_token: String,
    pub accept_personal_auth: String,
    pub amount_in_cents: i64,
    pub currency: String,
    pub signature: String,
    pub customer_email: String,
    pub reference: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    #[serde(rename = "type")]
    pub method_type: String,
    pub token: String,
    pub installments: u32,
}

/// Every successful gateway response wraps its payload in a `data` field.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// The gateway's view of a transaction. `status` is the gateway's own vocabulary and is deliberately left as a
/// string here; interpreting it is the caller's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub id: String,
    pub status: String,
    pub reference: String,
    pub amount_in_cents: i64,
    #[serde(default)]
    pub status_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub messages: Option<Value>,
}

impl ErrorBody {
    /// Flattens the `messages` field, which may be a string, a list, or a map of field names to lists of messages.
    pub fn describe(&self) -> String {
        let messages = match &self.messages {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(a)) => a.iter().map(plain_string).collect::<Vec<_>>().join(", "),
            Some(other) => other.to_string(),
        };
        match (&self.error_type, messages.is_empty()) {
            (Some(t), true) => t.clone(),
            (Some(t), false) => format!("{t}: {messages}"),
            (None, _) => messages,
        }
    }
}

/// Renders a JSON scalar the way it would appear when interpolated into a string: strings without quotes,
/// everything else in its JSON form.
pub(crate) fn plain_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
