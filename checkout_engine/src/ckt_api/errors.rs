use thiserror::Error;

use crate::traits::{CheckoutDatabaseError, GatewayError, InventoryError};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Invalid checkout request. {0}")]
    Validation(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Not enough stock of product {product_id} to reserve {requested} units")]
    InsufficientStock { product_id: i64, requested: i64 },
    #[error("Payment could not be started. {0}")]
    Gateway(#[from] GatewayError),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<CheckoutDatabaseError> for CheckoutError {
    fn from(e: CheckoutDatabaseError) -> Self {
        CheckoutError::Database(e.to_string())
    }
}

impl From<InventoryError> for CheckoutError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::InvalidQuantity(q) => CheckoutError::Validation(format!("Invalid quantity: {q}")),
            InventoryError::DatabaseError(s) => CheckoutError::Database(s),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("The webhook signature is missing or invalid")]
    Unauthorized,
    #[error("The webhook payload could not be understood. {0}")]
    InvalidPayload(String),
    #[error("Could not query the payment gateway. {0}")]
    Gateway(#[from] GatewayError),
    #[error("Database error: {0}")]
    Database(String),
}

impl ReconciliationError {
    /// Whether the same job could succeed if tried again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconciliationError::Gateway(e) => e.is_retryable(),
            ReconciliationError::Database(_) => true,
            _ => false,
        }
    }
}

impl From<CheckoutDatabaseError> for ReconciliationError {
    fn from(e: CheckoutDatabaseError) -> Self {
        ReconciliationError::Database(e.to_string())
    }
}
