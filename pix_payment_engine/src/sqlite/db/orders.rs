use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderStatusType, PaymentId, PaymentUpdate},
    traits::OrderStoreError,
};

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
///
/// New orders are always `pending`. The items are not inserted here; see [`super::order_items::insert_items`].
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderStoreError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                customer_id,
                status,
                total_amount,
                currency,
                checkout_id,
                payment_id,
                qr_code,
                qr_code_base64,
                pix_expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(order.customer_id)
    .bind(OrderStatusType::Pending)
    .bind(order.total_amount)
    .bind(&order.currency)
    .bind(&order.checkout_id)
    .bind(&order.payment_id)
    .bind(&order.qr_code)
    .bind(&order.qr_code_base64)
    .bind(order.pix_expires_at)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order {} for checkout {} inserted (payment {})", order.id, order.checkout_id, order.payment_id);
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_order_by_checkout_id(
    checkout_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE checkout_id = $1").bind(checkout_id).fetch_optional(conn).await
}

pub async fn fetch_order_by_payment_id(
    payment_id: &PaymentId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE payment_id = $1").bind(payment_id).fetch_optional(conn).await
}

/// Writes the payment update, but only if the order currently has `expected_status` and at least one of the fields
/// would change. Absent QR/expiry fields in the update keep their stored values.
///
/// Returns the updated order, or `None` if nothing was written.
pub async fn conditional_payment_update(
    id: i64,
    expected_status: OrderStatusType,
    update: &PaymentUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET
            status = $1,
            qr_code = COALESCE($2, qr_code),
            qr_code_base64 = COALESCE($3, qr_code_base64),
            pix_expires_at = COALESCE($4, pix_expires_at),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $5 AND status = $6 AND (
            status IS NOT $1 OR
            ($2 IS NOT NULL AND qr_code IS NOT $2) OR
            ($3 IS NOT NULL AND qr_code_base64 IS NOT $3) OR
            ($4 IS NOT NULL AND pix_expires_at IS NOT $4)
        )
        RETURNING *"#,
    )
    .bind(update.status)
    .bind(&update.qr_code)
    .bind(&update.qr_code_base64)
    .bind(update.pix_expires_at)
    .bind(id)
    .bind(expected_status)
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ Conditional payment update for order {id}: {}", if order.is_some() { "written" } else { "no-op" });
    Ok(order)
}

/// Moves a pending order owned by `customer_id` to `canceled`. Returns `None` if the order does not exist, belongs to
/// someone else, or is not pending.
pub async fn cancel_if_pending(
    id: i64,
    customer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $2 AND customer_id = $3 AND status = $4
        RETURNING *"#,
    )
    .bind(OrderStatusType::Canceled)
    .bind(id)
    .bind(customer_id)
    .bind(OrderStatusType::Pending)
    .fetch_optional(conn)
    .await
}
