//! `SqliteDatabase` is a concrete implementation of a PIX payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{customers, db_url, inventory, new_pool, order_items, orders};
use crate::{
    db_types::{Customer, InventoryRecord, NewOrder, NewOrderItem, Order, OrderItem, PaymentId, PaymentUpdate},
    helpers::aggregate_quantities,
    traits::{
        CheckoutDatabase,
        CustomerDirectory,
        CustomerError,
        InventoryError,
        InventoryManagement,
        OrderManagement,
        OrderStoreError,
        StatusChange,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Stock is decremented first, so the transaction's opening statement is a write and takes SQLite's write lock
    /// before anything is read.
    async fn insert_checkout_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>), OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        for (product_id, quantity) in aggregate_quantities(&order.items)? {
            inventory::decrement_stock(product_id, quantity, &mut tx).await?;
        }
        let saved = orders::insert_order(&order, &mut tx).await?;
        let items = order_items::insert_items(saved.id, &order.items, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Checkout {} saved as order {} with {} items", saved.checkout_id, saved.id, items.len());
        Ok((saved, items))
    }

    async fn close(&mut self) {
        self.pool.close().await;
    }
}

impl InventoryManagement for SqliteDatabase {
    async fn verify_availability(&self, items: &[NewOrderItem]) -> Result<(), InventoryError> {
        let mut conn = self.pool.acquire().await?;
        inventory::verify_availability(items, &mut conn).await
    }

    async fn decrement_stock(&self, product_id: i64, quantity: i64) -> Result<i64, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        inventory::decrement_stock(product_id, quantity, &mut conn).await
    }

    async fn increment_stock(&self, product_id: i64, quantity: i64) -> Result<i64, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        inventory::increment_stock(product_id, quantity, &mut conn).await
    }

    async fn fetch_inventory(&self, product_id: i64) -> Result<Option<InventoryRecord>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        inventory::fetch_inventory(product_id, &mut conn).await
    }

    async fn set_stock(&self, product_id: i64, qty_on_hand: i64) -> Result<InventoryRecord, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        inventory::set_stock(product_id, qty_on_hand, &mut conn).await
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_checkout_id(&self, checkout_id: &str) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_checkout_id(checkout_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_payment_id(&self, payment_id: &PaymentId) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_payment_id(payment_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let items = order_items::fetch_items_for_order(order_id, &mut conn).await?;
        Ok(items)
    }

    /// The first attempt assumes the order is still pending. That statement is a write, so once it has run this
    /// transaction holds the write lock and the follow-up read sees the committed state no other writer can change.
    async fn apply_payment_update(&self, order_id: i64, update: PaymentUpdate) -> Result<StatusChange, OrderStoreError> {
        use crate::db_types::OrderStatusType::{Canceled, Pending};
        let mut tx = self.pool.begin().await?;
        let mut previous_status = Pending;
        let mut written = orders::conditional_payment_update(order_id, Pending, &update, &mut tx).await?;
        if written.is_none() {
            let current =
                orders::fetch_order_by_id(order_id, &mut tx).await?.ok_or(OrderStoreError::OrderNotFound(order_id))?;
            if current.status != Pending {
                previous_status = current.status;
                written = orders::conditional_payment_update(order_id, current.status, &update, &mut tx).await?;
            }
            if written.is_none() {
                tx.commit().await?;
                trace!("🗃️ Order {order_id} is already up to date ({})", current.status);
                return Ok(StatusChange { order: current, previous_status, changed: false });
            }
        }
        let order = written.ok_or(OrderStoreError::OrderNotFound(order_id))?;
        if previous_status == Pending && order.status == Canceled {
            order_items::restock_items(order_id, &mut tx).await?;
            debug!("🗃️ Order {order_id} was canceled by the gateway. Its items have been returned to stock");
        }
        tx.commit().await?;
        debug!("🗃️ Order {order_id} updated from payment {}: {previous_status} -> {}", order.payment_id, order.status);
        Ok(StatusChange { order, previous_status, changed: true })
    }

    async fn cancel_pending_order(&self, order_id: i64, customer_id: i64) -> Result<Order, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let canceled = orders::cancel_if_pending(order_id, customer_id, &mut tx).await?;
        let Some(order) = canceled else {
            let current =
                orders::fetch_order_by_id(order_id, &mut tx).await?.ok_or(OrderStoreError::OrderNotFound(order_id))?;
            return if current.customer_id != customer_id {
                Err(OrderStoreError::Forbidden { order_id, customer_id })
            } else {
                Err(OrderStoreError::OrderNotPending { order_id, status: current.status })
            };
        };
        order_items::restock_items(order_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {order_id} canceled by customer {customer_id}. Its items have been returned to stock");
        Ok(order)
    }
}

impl CustomerDirectory for SqliteDatabase {
    async fn fetch_customer(&self, customer_id: i64) -> Result<Option<Customer>, CustomerError> {
        let mut conn = self.pool.acquire().await?;
        customers::fetch_customer(customer_id, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Adds a customer record. Customers are normally managed by the identity service; this is for seeding and tests.
    pub async fn insert_customer(&self, email: Option<&str>, name: Option<&str>) -> Result<Customer, CustomerError> {
        let mut conn = self.pool.acquire().await?;
        customers::insert_customer(email, name, &mut conn).await
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
