use std::fmt::Debug;

use crate::{
    db_types::Product,
    traits::{InventoryError, InventoryManagement},
};

/// Read access to the product catalog.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B>
where B: InventoryManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn products(&self) -> Result<Vec<Product>, InventoryError> {
        self.db.fetch_products().await
    }

    pub async fn product(&self, id: i64) -> Result<Option<Product>, InventoryError> {
        self.db.fetch_product(id).await
    }
}
