use log::{trace, warn};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrderItem, OrderItem},
    traits::{InventoryError, OrderStoreError},
};

pub async fn insert_items(
    order_id: i64,
    items: &[NewOrderItem],
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, OrderStoreError> {
    let mut result = Vec::with_capacity(items.len());
    for item in items {
        let subtotal = item.subtotal().ok_or(InventoryError::TooLarge(item.product_id))?;
        let row: OrderItem = sqlx::query_as(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, unit_amount, subtotal_amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *"#,
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_amount)
        .bind(subtotal)
        .fetch_one(&mut *conn)
        .await?;
        trace!("🗃️ Order {order_id}: item {} inserted ({} x product {})", row.id, row.quantity, row.product_id);
        result.push(row);
    }
    Ok(result)
}

pub async fn fetch_items_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC").bind(order_id).fetch_all(conn).await
}

/// Returns every unit in the order to stock. Items whose inventory record has since been removed are skipped.
pub async fn restock_items(order_id: i64, conn: &mut SqliteConnection) -> Result<(), OrderStoreError> {
    let items = fetch_items_for_order(order_id, &mut *conn).await?;
    for item in items {
        match super::inventory::increment_stock(item.product_id, item.quantity, &mut *conn).await {
            Ok(_) => {},
            Err(InventoryError::ProductNotFound(id)) => {
                warn!("🗃️ Cannot return {} units of product {id} to stock: it has no inventory record", item.quantity);
            },
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
