use thiserror::Error;

use crate::db_types::{NewProduct, Product};

/// The inventory ledger.
///
/// Each product carries two counters, `stock_quantity` and `reserved_quantity`, with
/// `reserved_quantity <= stock_quantity` at all times. Backends must implement every mutation as a single atomic
/// conditional update against the stored counters, so that any number of concurrent callers can never oversell.
/// A read followed by a write is not acceptable.
#[allow(async_fn_in_trait)]
pub trait InventoryManagement: Clone {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, InventoryError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, InventoryError>;

    /// All products, ordered by id.
    async fn fetch_products(&self) -> Result<Vec<Product>, InventoryError>;

    /// Earmarks `quantity` units for a pending transaction. Succeeds iff
    /// `stock_quantity - reserved_quantity >= quantity` at the instant of the update. Returns `false`, without
    /// modifying anything, otherwise.
    async fn reserve_stock(&self, product_id: i64, quantity: i64) -> Result<bool, InventoryError>;

    /// Gives back `quantity` reserved units. Succeeds iff `reserved_quantity >= quantity`.
    async fn release_stock(&self, product_id: i64, quantity: i64) -> Result<bool, InventoryError>;

    /// Permanently consumes `quantity` reserved units. Succeeds iff `reserved_quantity >= quantity` and
    /// `stock_quantity >= quantity`.
    async fn commit_stock(&self, product_id: i64, quantity: i64) -> Result<bool, InventoryError>;
}

#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Stock quantities must be positive, but {0} was requested")]
    InvalidQuantity(i64),
}

impl From<sqlx::Error> for InventoryError {
    fn from(e: sqlx::Error) -> Self {
        InventoryError::DatabaseError(e.to_string())
    }
}
