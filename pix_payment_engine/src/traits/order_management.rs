use std::future::Future;

use thiserror::Error;

use crate::{
    db_types::{Order, OrderItem, OrderStatusType, PaymentId, PaymentUpdate},
    traits::{InventoryError, StatusChange},
};

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("The requested order (internal id {0}) does not exist")]
    OrderNotFound(i64),
    #[error("There is no order for payment {0}")]
    PaymentNotFound(PaymentId),
    #[error("Customer {customer_id} does not own order {order_id}")]
    Forbidden { order_id: i64, customer_id: i64 },
    #[error("Order {order_id} cannot be changed because it is {status}")]
    OrderNotPending { order_id: i64, status: OrderStatusType },
    #[error("{0}")]
    Inventory(#[from] InventoryError),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}

/// Reads orders and moves them through their lifecycle.
pub trait OrderManagement {
    fn fetch_order_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Order>, OrderStoreError>> + Send;

    fn fetch_order_by_checkout_id(
        &self,
        checkout_id: &str,
    ) -> impl Future<Output = Result<Option<Order>, OrderStoreError>> + Send;

    fn fetch_order_by_payment_id(
        &self,
        payment_id: &PaymentId,
    ) -> impl Future<Output = Result<Option<Order>, OrderStoreError>> + Send;

    fn fetch_order_items(&self, order_id: i64) -> impl Future<Output = Result<Vec<OrderItem>, OrderStoreError>> + Send;

    /// Brings the order in line with the gateway's view of its charge.
    ///
    /// The write only happens if at least one field actually differs, so applying the same update twice leaves the
    /// stored order untouched (including `updated_at`) and reports `changed == false` the second time.
    ///
    /// QR artifacts and expiry that are absent from the update keep their stored values.
    ///
    /// If, and only if, this call moves the order from `pending` to `canceled`, the order's items are returned to
    /// stock inside the same transaction.
    fn apply_payment_update(
        &self,
        order_id: i64,
        update: PaymentUpdate,
    ) -> impl Future<Output = Result<StatusChange, OrderStoreError>> + Send;

    /// Cancels a pending order on behalf of its owner and returns its items to stock, atomically.
    ///
    /// Fails with [`OrderStoreError::Forbidden`] if `customer_id` does not own the order, and with
    /// [`OrderStoreError::OrderNotPending`] if the order is already paid or canceled.
    fn cancel_pending_order(
        &self,
        order_id: i64,
        customer_id: i64,
    ) -> impl Future<Output = Result<Order, OrderStoreError>> + Send;
}
