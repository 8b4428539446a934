use std::fmt::Debug;

use log::*;

use crate::{
    db_types::InventoryRecord,
    traits::{InventoryError, InventoryManagement},
};

/// Stock administration: reading stock levels and setting them (e.g. after a delivery or a stock take).
pub struct InventoryApi<B> {
    db: B,
}

impl<B> Debug for InventoryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InventoryApi")
    }
}

impl<B> InventoryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> InventoryApi<B>
where B: InventoryManagement
{
    pub async fn stock_for_product(&self, product_id: i64) -> Result<InventoryRecord, InventoryError> {
        self.db.fetch_inventory(product_id).await?.ok_or(InventoryError::ProductNotFound(product_id))
    }

    pub async fn set_stock(&self, product_id: i64, qty_on_hand: i64) -> Result<InventoryRecord, InventoryError> {
        let record = self.db.set_stock(product_id, qty_on_hand).await?;
        info!("📦️ Stock for product {product_id} is now {}", record.qty_on_hand);
        Ok(record)
    }
}
