use actix_web::{http::StatusCode, test::TestRequest};
use pix_payment_engine::{db_types::PaymentId, InventoryManagement, OrderManagement};
use serde_json::json;

use super::helpers::{json, TestSystem};
use crate::helpers::{calculate_hmac, signature_manifest};

const PRODUCT: i64 = 20;
const SECRET: &str = "webhook-test-secret";

async fn checkout(sys: &TestSystem, qty: i64) -> (i64, PaymentId) {
    let body = json!({
        "customer_id": sys.customer.id,
        "total_amount": 500 * qty,
        "items": [{"product_id": PRODUCT, "quantity": qty, "unit_amount": 500}]
    });
    let (status, body) = sys.send(TestRequest::post().uri("/checkout/pix").set_json(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let result = json(&body);
    let payment_id = PaymentId::from(result["pix"]["payment_id"].as_str().unwrap());
    (result["order"]["id"].as_i64().unwrap(), payment_id)
}

async fn order_status(sys: &TestSystem, order_id: i64) -> String {
    sys.db.fetch_order_by_id(order_id).await.unwrap().unwrap().status.to_string()
}

fn notification(payment_id: &PaymentId) -> serde_json::Value {
    json!({"id": 1, "type": "payment", "action": "payment.updated", "data": {"id": payment_id.as_str()}})
}

#[actix_web::test]
async fn approved_payment_notification() {
    let sys = TestSystem::new(&[(PRODUCT, 4)]).await;
    let (order_id, payment_id) = checkout(&sys, 2).await;
    sys.gateway.set_status(&payment_id, "approved");
    let req = TestRequest::post().uri("/webhooks/mercadopago").set_json(notification(&payment_id));
    let (status, body) = sys.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(order_status(&sys, order_id).await, "paid");
    assert!(!sys.registry.is_active(&payment_id));
    assert_eq!(sys.db.fetch_inventory(PRODUCT).await.unwrap().unwrap().qty_on_hand, 2);
}

#[actix_web::test]
async fn rejected_payment_notification_returns_stock_once() {
    let sys = TestSystem::new(&[(PRODUCT, 4)]).await;
    let (order_id, payment_id) = checkout(&sys, 3).await;
    sys.gateway.set_status(&payment_id, "rejected");
    for _ in 0..2 {
        let uri = format!("/webhooks/mercadopago?data.id={payment_id}&type=payment");
        let (status, _) = sys.send(TestRequest::post().uri(&uri)).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(order_status(&sys, order_id).await, "canceled");
    assert_eq!(sys.db.fetch_inventory(PRODUCT).await.unwrap().unwrap().qty_on_hand, 4);
}

#[actix_web::test]
async fn useless_notifications_are_acknowledged() {
    let sys = TestSystem::new(&[(PRODUCT, 4)]).await;
    let (order_id, payment_id) = checkout(&sys, 1).await;
    let bodies = ["", "not json", "{}", r#"{"data": {"id": "777"}}"#];
    for body in bodies {
        let req = TestRequest::post()
            .uri("/webhooks/mercadopago")
            .insert_header(("content-type", "application/json"))
            .set_payload(body);
        let (status, _) = sys.send(req).await;
        assert_eq!(status, StatusCode::OK, "Body: {body}");
    }
    // The gateway is down: still acknowledged, order untouched
    sys.gateway.fail_status_queries(Some(pix_payment_engine::GatewayError::Unavailable("timeout".into())));
    let req = TestRequest::post().uri("/webhooks/mercadopago").set_json(notification(&payment_id));
    let (status, _) = sys.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order_status(&sys, order_id).await, "pending");
    sys.shutdown();
}

#[actix_web::test]
async fn signed_notifications() {
    let sys = TestSystem::new(&[(PRODUCT, 4)]).await.with_webhook_secret(SECRET);
    let (order_id, payment_id) = checkout(&sys, 1).await;
    sys.gateway.set_status(&payment_id, "approved");

    let req = TestRequest::post().uri("/webhooks/mercadopago").set_json(notification(&payment_id));
    let (status, _) = sys.send(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let forged = calculate_hmac("wrong-secret", signature_manifest(Some(payment_id.as_str()), Some("req-9"), "1700").as_bytes());
    let req = TestRequest::post()
        .uri("/webhooks/mercadopago")
        .insert_header(("x-signature", format!("ts=1700,v1={forged}")))
        .insert_header(("x-request-id", "req-9"))
        .set_json(notification(&payment_id));
    let (status, _) = sys.send(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(order_status(&sys, order_id).await, "pending");

    let v1 = calculate_hmac(SECRET, signature_manifest(Some(payment_id.as_str()), Some("req-10"), "1701").as_bytes());
    let req = TestRequest::post()
        .uri("/webhooks/mercadopago")
        .insert_header(("x-signature", format!("ts=1701,v1={v1}")))
        .insert_header(("x-request-id", "req-10"))
        .set_json(notification(&payment_id));
    let (status, _) = sys.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order_status(&sys, order_id).await, "paid");
}
