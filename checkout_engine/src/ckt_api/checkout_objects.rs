use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::db_types::{Cents, NewCustomer, NewDelivery, TransactionStatus};

fn default_installments() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub email: String,
    pub full_name: String,
}

impl From<CustomerDetails> for NewCustomer {
    fn from(c: CustomerDetails) -> Self {
        NewCustomer { email: c.email.trim().to_string(), full_name: c.full_name.trim().to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub address: String,
    pub city: String,
    pub phone: String,
}

impl From<DeliveryDetails> for NewDelivery {
    fn from(d: DeliveryDetails) -> Self {
        NewDelivery {
            address: d.address.trim().to_string(),
            city: d.city.trim().to_string(),
            phone: d.phone.trim().to_string(),
        }
    }
}

/// A buyer's request to purchase `quantity` units of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub product_id: i64,
    pub quantity: i64,
    /// The tokenized card, as issued to the buyer's browser by the gateway.
    pub payment_token: String,
    pub acceptance_token: String,
    #[serde(default)]
    pub accept_personal_auth: Option<String>,
    #[serde(default = "default_installments")]
    pub installments: u32,
    pub customer: CustomerDetails,
    pub delivery: DeliveryDetails,
}

impl CheckoutRequest {
    /// Returns a description of the first problem found, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.quantity < 1 {
            return Err(format!("Quantity must be at least 1, not {}", self.quantity));
        }
        if self.installments < 1 {
            return Err("Installments must be at least 1".into());
        }
        if self.payment_token.trim().is_empty() {
            return Err("A payment token is required".into());
        }
        if self.acceptance_token.trim().is_empty() {
            return Err("An acceptance token is required".into());
        }
        let email = self.customer.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(format!("'{email}' is not a valid email address"));
        }
        let required = [
            ("Customer name", &self.customer.full_name),
            ("Delivery address", &self.delivery.address),
            ("Delivery city", &self.delivery.city),
            ("Delivery phone", &self.delivery.phone),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("{field} is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub transaction_id: i64,
    pub reference: String,
    pub status: TransactionStatus,
    pub total: Cents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Added to every checkout.
    pub base_fee: Cents,
    pub delivery_fee: Cents,
    /// How long a reservation is held before the sweeper may void it.
    pub hold_duration: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self { base_fee: Cents::from(0), delivery_fee: Cents::from(0), hold_duration: Duration::minutes(15) }
    }
}

impl CheckoutConfig {
    pub fn total_for(&self, unit_price: Cents, quantity: i64) -> Cents {
        unit_price * quantity + self.base_fee + self.delivery_fee
    }
}
