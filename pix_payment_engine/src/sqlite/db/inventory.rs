use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{InventoryRecord, NewOrderItem},
    helpers::aggregate_quantities,
    traits::InventoryError,
};

pub async fn fetch_inventory(
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<InventoryRecord>, InventoryError> {
    let record = sqlx::query_as("SELECT * FROM inventory WHERE product_id = $1")
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(record)
}

pub async fn verify_availability(items: &[NewOrderItem], conn: &mut SqliteConnection) -> Result<(), InventoryError> {
    for (product_id, requested) in aggregate_quantities(items)? {
        let available = fetch_inventory(product_id, &mut *conn).await?.map(|r| r.qty_on_hand).unwrap_or(0);
        trace!("🗃️ Product {product_id}: {requested} requested, {available} available");
        if requested > available {
            return Err(InventoryError::InsufficientStock { product_id, requested, available });
        }
    }
    Ok(())
}

/// Conditionally removes stock. The check and the update are a single statement, so two concurrent decrements can
/// never both succeed against stock that only covers one of them.
pub async fn decrement_stock(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<i64, InventoryError> {
    if quantity <= 0 {
        return Err(InventoryError::InvalidQuantity(quantity));
    }
    let remaining: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE inventory SET qty_on_hand = qty_on_hand - $1, updated_at = CURRENT_TIMESTAMP
        WHERE product_id = $2 AND qty_on_hand >= $1
        RETURNING qty_on_hand"#,
    )
    .bind(quantity)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;
    match remaining {
        Some(qty) => {
            debug!("🗃️ Removed {quantity} units of product {product_id}. {qty} left");
            Ok(qty)
        },
        None => match fetch_inventory(product_id, conn).await? {
            Some(record) => Err(InventoryError::InsufficientStock {
                product_id,
                requested: quantity,
                available: record.qty_on_hand,
            }),
            None => Err(InventoryError::ProductNotFound(product_id)),
        },
    }
}

pub async fn increment_stock(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<i64, InventoryError> {
    if quantity <= 0 {
        return Err(InventoryError::InvalidQuantity(quantity));
    }
    let qty: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE inventory SET qty_on_hand = qty_on_hand + $1, updated_at = CURRENT_TIMESTAMP
        WHERE product_id = $2
        RETURNING qty_on_hand"#,
    )
    .bind(quantity)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    let qty = qty.ok_or(InventoryError::ProductNotFound(product_id))?;
    debug!("🗃️ Returned {quantity} units of product {product_id} to stock. {qty} on hand");
    Ok(qty)
}

pub async fn set_stock(
    product_id: i64,
    qty_on_hand: i64,
    conn: &mut SqliteConnection,
) -> Result<InventoryRecord, InventoryError> {
    if qty_on_hand < 0 {
        return Err(InventoryError::InvalidQuantity(qty_on_hand));
    }
    let record = sqlx::query_as(
        r#"
        INSERT INTO inventory (product_id, qty_on_hand) VALUES ($1, $2)
        ON CONFLICT (product_id) DO UPDATE SET qty_on_hand = excluded.qty_on_hand, updated_at = CURRENT_TIMESTAMP
        RETURNING *"#,
    )
    .bind(product_id)
    .bind(qty_on_hand)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Stock for product {product_id} set to {qty_on_hand}");
    Ok(record)
}
