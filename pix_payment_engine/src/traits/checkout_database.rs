use std::future::Future;

use crate::{
    db_types::{NewOrder, Order, OrderItem},
    traits::{CustomerDirectory, InventoryManagement, OrderManagement, OrderStoreError},
};

/// The highest level of behaviour a storage backend must offer to support PIX checkouts.
pub trait CheckoutDatabase:
    Clone + Send + Sync + 'static + InventoryManagement + OrderManagement + CustomerDirectory
{
    /// The URL of the database
    fn url(&self) -> &str;

    /// In a single atomic transaction,
    /// * decrements stock for every item in the order, failing if any product has insufficient stock,
    /// * inserts the order with `pending` status,
    /// * inserts its items.
    ///
    /// Either everything is committed, or nothing is.
    fn insert_checkout_order(
        &self,
        order: NewOrder,
    ) -> impl Future<Output = Result<(Order, Vec<OrderItem>), OrderStoreError>> + Send;

    /// Closes the database connection.
    fn close(&mut self) -> impl Future<Output = ()> + Send {
        async {}
    }
}
