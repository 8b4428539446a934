use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::json;

use super::helpers::{json, TestSystem};

#[actix_web::test]
async fn set_and_read_stock() {
    let sys = TestSystem::new(&[]).await;
    let (status, _) = sys.send(TestRequest::get().uri("/inventory/5")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = TestRequest::put().uri("/inventory/5").set_json(json!({"qty_on_hand": 12}));
    let (status, body) = sys.send(req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(json(&body), json!({"product_id": 5, "qty_on_hand": 12}));

    let req = TestRequest::put().uri("/inventory/5").set_json(json!({"qty_on_hand": 4}));
    let (status, _) = sys.send(req).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = sys.send(TestRequest::get().uri("/inventory/5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["qty_on_hand"], 4);
}

#[actix_web::test]
async fn negative_stock_is_refused() {
    let sys = TestSystem::new(&[(5, 3)]).await;
    let req = TestRequest::put().uri("/inventory/5").set_json(json!({"qty_on_hand": -1}));
    let (status, _) = sys.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = sys.send(TestRequest::get().uri("/inventory/5")).await;
    assert_eq!(json(&body)["qty_on_hand"], 3);
}
