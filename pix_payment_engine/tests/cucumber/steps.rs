use std::time::Duration;

use cucumber::{then, when};
use pix_payment_engine::{
    checkout_objects::{CheckoutRequest, NotificationOutcome, PaymentNotice},
    db_types::{Cents, NewOrderItem, OrderStatusType},
    CheckoutError,
    InventoryManagement,
    OrderManagement,
};

use crate::cucumber::CheckoutWorld;

#[when(expr = "the customer checks out {int} unit(s) of product {int} at {int} cents each")]
async fn checkout(world: &mut CheckoutWorld, qty: i64, product_id: i64, unit: i64) {
    let customer_id = world.system().customer.id;
    let item = NewOrderItem::new(product_id, qty, Cents::from(unit));
    let request = CheckoutRequest::new(customer_id, Cents::from(qty * unit), vec![item]);
    let result = world.api().create_checkout(request).await;
    world.last_checkout = Some(result);
}

#[when(expr = "the gateway reports the payment as {string}")]
async fn gateway_status(world: &mut CheckoutWorld, status: String) {
    let payment_id = world.checkout_order().payment_id.clone();
    world.gateway().set_status(&payment_id, &status);
}

#[when("a webhook notification arrives for the payment")]
async fn webhook(world: &mut CheckoutWorld) {
    let payment_id = world.checkout_order().payment_id.to_string();
    let notice = PaymentNotice::new(Some(payment_id)).with_topic(Some("payment.updated".into()));
    let outcome = world.api().handle_notification(notice).await;
    assert!(matches!(outcome, NotificationOutcome::Reconciled { .. }), "Unexpected outcome: {outcome:?}");
}

#[when(expr = "a webhook notification arrives for unknown payment {string}")]
async fn unknown_webhook(world: &mut CheckoutWorld, payment_id: String) {
    world.gateway().set_status(&payment_id.as_str().into(), "approved");
    let outcome = world.api().handle_notification(PaymentNotice::new(Some(payment_id))).await;
    assert!(matches!(outcome, NotificationOutcome::UnknownPayment(_)), "Unexpected outcome: {outcome:?}");
}

#[when("the customer refreshes the payment")]
async fn refresh(world: &mut CheckoutWorld) {
    let payment_id = world.checkout_order().payment_id.clone();
    let result = world.api().refresh_payment(&payment_id).await.expect("Error refreshing payment");
    assert_eq!(result.pix.payment_id, payment_id);
}

#[when("the customer cancels the order")]
async fn customer_cancels(world: &mut CheckoutWorld) {
    let order = world.checkout_order().clone();
    let result = world.api().cancel_order(order.id, order.customer_id).await;
    world.last_cancel = Some(result);
}

#[when("another customer tries to cancel the order")]
async fn stranger_cancels(world: &mut CheckoutWorld) {
    let order_id = world.checkout_order().id;
    let stranger = world.system().other_customer.id;
    let result = world.api().cancel_order(order_id, stranger).await;
    world.last_cancel = Some(result);
}

#[when(expr = "I pause for {int}ms")]
async fn pause(_world: &mut CheckoutWorld, ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[then("the checkout succeeds with a pending order")]
async fn checkout_succeeded(world: &mut CheckoutWorld) {
    let order = world.checkout_order();
    assert_eq!(order.status, OrderStatusType::Pending);
    assert_eq!(order.currency, "BRL");
    assert!(order.checkout_id.as_str().starts_with("PIX-"));
}

#[then("the order has a PIX QR code")]
async fn has_qr_code(world: &mut CheckoutWorld) {
    let Some(Ok(result)) = &world.last_checkout else { panic!("No successful checkout") };
    assert!(result.pix.qr_code.is_some());
    assert!(result.pix.qr_code_base64.is_some());
    assert!(result.pix.expires_at.is_some());
    assert_eq!(result.order.qr_code, result.pix.qr_code);
}

#[then(expr = "the checkout fails with {word}")]
async fn checkout_failed(world: &mut CheckoutWorld, reason: String) {
    let Some(Err(e)) = &world.last_checkout else { panic!("Expected the checkout to fail") };
    match reason.as_str() {
        "insufficient_stock" => assert!(matches!(e, CheckoutError::InsufficientStock { .. }), "{e}"),
        "gateway_error" => assert!(matches!(e, CheckoutError::GatewayError(_)), "{e}"),
        "validation_error" => assert!(matches!(e, CheckoutError::ValidationError(_)), "{e}"),
        _ => panic!("Unknown failure reason {reason}"),
    }
}

#[then(expr = "the gateway received {int} charge request(s)")]
async fn charge_requests(world: &mut CheckoutWorld, n: usize) {
    assert_eq!(world.gateway().charge_requests().len(), n);
}

#[then(expr = "product {int} has {int} unit(s) in stock")]
async fn stock_is(world: &mut CheckoutWorld, product_id: i64, qty: i64) {
    let record = world.api().db().fetch_inventory(product_id).await.expect("Error fetching inventory");
    let record = record.expect("Product has no inventory record");
    assert_eq!(record.qty_on_hand, qty, "Stock level for product {product_id}");
}

#[then(expr = "the order status is {word}")]
async fn order_status(world: &mut CheckoutWorld, status: String) {
    let expected = status.parse::<OrderStatusType>().expect("Not a valid order status");
    let id = world.checkout_order().id;
    let order = world.api().db().fetch_order_by_id(id).await.expect("Error fetching order").expect("Order not found");
    assert_eq!(order.status, expected);
}

#[then("no poller is active for the payment")]
async fn no_poller(world: &mut CheckoutWorld) {
    let payment_id = world.checkout_order().payment_id.clone();
    assert!(!world.api().registry().is_active(&payment_id));
}

#[then("a poller is active for the payment")]
async fn poller_active(world: &mut CheckoutWorld) {
    let payment_id = world.checkout_order().payment_id.clone();
    assert!(world.api().registry().is_active(&payment_id));
}

#[then("the cancellation succeeds")]
async fn cancel_succeeded(world: &mut CheckoutWorld) {
    let Some(Ok(result)) = &world.last_cancel else { panic!("Expected the cancellation to succeed") };
    assert_eq!(result.order.status, OrderStatusType::Canceled);
}

#[then(expr = "the cancellation fails with {word}")]
async fn cancel_failed(world: &mut CheckoutWorld, reason: String) {
    let Some(Err(e)) = &world.last_cancel else { panic!("Expected the cancellation to fail") };
    match reason.as_str() {
        "forbidden" => assert!(matches!(e, CheckoutError::Forbidden { .. }), "{e}"),
        "not_pending" => assert!(matches!(e, CheckoutError::OrderNotPending { .. }), "{e}"),
        _ => panic!("Unknown failure reason {reason}"),
    }
}
