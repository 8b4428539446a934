use actix_web::{http::StatusCode, test::TestRequest};
use pix_payment_engine::{db_types::PaymentId, GatewayError, InventoryManagement};
use serde_json::json;

use super::helpers::{json, TestSystem};

const PRODUCT: i64 = 10;

fn checkout_body(customer_id: i64, qty: i64) -> serde_json::Value {
    json!({
        "customer_id": customer_id,
        "total_amount": 1000 * qty,
        "items": [{"product_id": PRODUCT, "quantity": qty, "unit_amount": 1000}]
    })
}

async fn checkout(sys: &TestSystem, qty: i64) -> serde_json::Value {
    let req = TestRequest::post().uri("/checkout/pix").set_json(checkout_body(sys.customer.id, qty));
    let (status, body) = sys.send(req).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    json(&body)
}

#[actix_web::test]
async fn health_check() {
    let sys = TestSystem::new(&[]).await;
    let (status, body) = sys.send(TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn successful_checkout() {
    let sys = TestSystem::new(&[(PRODUCT, 5)]).await;
    let result = checkout(&sys, 2).await;
    assert_eq!(result["order"]["status"], "pending");
    assert_eq!(result["order"]["currency"], "BRL");
    assert_eq!(result["order"]["total_amount"], 2000);
    assert_eq!(result["items"].as_array().unwrap().len(), 1);
    assert_eq!(result["pix"]["status"], "pending");
    assert!(result["pix"]["qr_code"].is_string());
    assert!(result["pix"]["qr_code_base64"].is_string());
    assert!(result["pix"]["checkout_id"].as_str().unwrap().starts_with("PIX-"));
    let stock = sys.db.fetch_inventory(PRODUCT).await.unwrap().unwrap();
    assert_eq!(stock.qty_on_hand, 3);
    let payment_id = PaymentId::from(result["pix"]["payment_id"].as_str().unwrap());
    assert!(sys.registry.is_active(&payment_id));
    sys.shutdown();
}

#[actix_web::test]
async fn checkout_failures() {
    let sys = TestSystem::new(&[(PRODUCT, 3)]).await;
    let req = TestRequest::post().uri("/checkout/pix").set_json(checkout_body(sys.customer.id, 10));
    let (status, body) = sys.send(req).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json(&body)["error"].as_str().unwrap().contains("Not enough stock"));
    assert!(sys.gateway.charge_requests().is_empty());

    let req = TestRequest::post().uri("/checkout/pix").set_json(checkout_body(999, 1));
    let (status, _) = sys.send(req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = TestRequest::post().uri("/checkout/pix").set_json(checkout_body(sys.customer.id, 0));
    let (status, _) = sys.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::post()
        .uri("/checkout/pix")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"customer_id\": ");
    let (status, body) = sys.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].is_string());

    // Quantities whose sum does not fit in an i64
    let half = i64::MAX / 2 + 1;
    let body = json!({
        "customer_id": sys.customer.id,
        "total_amount": 1000,
        "items": [
            {"product_id": PRODUCT, "quantity": half, "unit_amount": 0},
            {"product_id": PRODUCT, "quantity": half, "unit_amount": 0}
        ]
    });
    let (status, _) = sys.send(TestRequest::post().uri("/checkout/pix").set_json(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body = json!({
        "customer_id": sys.customer.id,
        "total_amount": 1000,
        "items": [{"product_id": PRODUCT, "quantity": i64::MAX, "unit_amount": 2}]
    });
    let (status, _) = sys.send(TestRequest::post().uri("/checkout/pix").set_json(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(sys.gateway.charge_requests().is_empty());

    sys.gateway.fail_charge_creation(Some(GatewayError::Unavailable("connection reset".into())));
    let req = TestRequest::post().uri("/checkout/pix").set_json(checkout_body(sys.customer.id, 1));
    let (status, _) = sys.send(req).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let stock = sys.db.fetch_inventory(PRODUCT).await.unwrap().unwrap();
    assert_eq!(stock.qty_on_hand, 3);
}

#[actix_web::test]
async fn refresh_payment() {
    let sys = TestSystem::new(&[(PRODUCT, 5)]).await;
    let result = checkout(&sys, 1).await;
    let payment_id = result["pix"]["payment_id"].as_str().unwrap().to_string();
    sys.gateway.set_status(&PaymentId::from(payment_id.as_str()), "approved");

    let req = TestRequest::get().uri(&format!("/checkout/pix/{payment_id}/refresh"));
    let (status, body) = sys.send(req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let refreshed = json(&body);
    assert_eq!(refreshed["order"]["status"], "paid");
    assert_eq!(refreshed["pix"]["status"], "approved");
    assert_eq!(refreshed["pix"]["qr_code"], result["pix"]["qr_code"]);
    assert!(!sys.registry.is_active(&PaymentId::from(payment_id.as_str())));

    let (status, _) = sys.send(TestRequest::get().uri("/checkout/pix/424242/refresh")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn cancel_and_fetch_orders() {
    let sys = TestSystem::new(&[(PRODUCT, 5)]).await;
    let stranger = sys.db.insert_customer(None, Some("Mallory")).await.unwrap();
    let result = checkout(&sys, 2).await;
    let order_id = result["order"]["id"].as_i64().unwrap();
    let cancel_uri = format!("/checkout/orders/{order_id}/cancel");

    let req = TestRequest::post().uri(&cancel_uri).set_json(json!({"customer_id": stranger.id}));
    let (status, _) = sys.send(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = TestRequest::post().uri(&cancel_uri).set_json(json!({"customer_id": sys.customer.id}));
    let (status, body) = sys.send(req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(json(&body)["order"]["status"], "canceled");
    assert_eq!(sys.db.fetch_inventory(PRODUCT).await.unwrap().unwrap().qty_on_hand, 5);

    let req = TestRequest::post().uri(&cancel_uri).set_json(json!({"customer_id": sys.customer.id}));
    let (status, _) = sys.send(req).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = sys.send(TestRequest::get().uri(&format!("/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let fetched = json(&body);
    assert_eq!(fetched["order"]["status"], "canceled");
    assert_eq!(fetched["items"][0]["quantity"], 2);
    assert_eq!(fetched["items"][0]["subtotal_amount"], 2000);

    let (status, _) = sys.send(TestRequest::get().uri("/orders/31337")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
