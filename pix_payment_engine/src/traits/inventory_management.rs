use std::future::Future;

use thiserror::Error;

use crate::db_types::{InventoryRecord, NewOrderItem};

#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("There is no inventory record for product {0}")]
    ProductNotFound(i64),
    #[error("Not enough stock for product {product_id}. Requested {requested}, but only {available} available")]
    InsufficientStock { product_id: i64, requested: i64, available: i64 },
    #[error("Stock quantities must be positive. Got {0}")]
    InvalidQuantity(i64),
    #[error("The quantities or amounts for product {0} are too large")]
    TooLarge(i64),
}

impl From<sqlx::Error> for InventoryError {
    fn from(e: sqlx::Error) -> Self {
        InventoryError::DatabaseError(e.to_string())
    }
}

/// The stock ledger.
///
/// Every mutation is scoped to a single product and is atomic with respect to concurrent mutations of the same
/// product. Quantities on hand are never negative.
pub trait InventoryManagement {
    /// Read-only availability check for a basket.
    ///
    /// Lines for the same product are summed before the comparison. A product without an inventory record counts as
    /// having no stock at all. Nothing is reserved by this call; it only lets a checkout fail fast.
    fn verify_availability(&self, items: &[NewOrderItem]) -> impl Future<Output = Result<(), InventoryError>> + Send;

    /// Removes `quantity` units of a product, failing with [`InventoryError::InsufficientStock`] if that would take the
    /// quantity on hand below zero, or with [`InventoryError::ProductNotFound`] if the product has no inventory record.
    /// Returns the new quantity on hand.
    fn decrement_stock(
        &self,
        product_id: i64,
        quantity: i64,
    ) -> impl Future<Output = Result<i64, InventoryError>> + Send;

    /// Returns `quantity` units of a product to stock. Returns the new quantity on hand.
    fn increment_stock(
        &self,
        product_id: i64,
        quantity: i64,
    ) -> impl Future<Output = Result<i64, InventoryError>> + Send;

    fn fetch_inventory(
        &self,
        product_id: i64,
    ) -> impl Future<Output = Result<Option<InventoryRecord>, InventoryError>> + Send;

    /// Creates the inventory record for the product if necessary, and sets its quantity on hand.
    fn set_stock(
        &self,
        product_id: i64,
        qty_on_hand: i64,
    ) -> impl Future<Output = Result<InventoryRecord, InventoryError>> + Send;
}
