use cucumber::given;
use pix_payment_engine::InventoryManagement;

use crate::cucumber::{checkout_world::CheckoutSystem, CheckoutWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut CheckoutWorld) {
    let system = CheckoutSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "product {int} has {int} unit(s) in stock")]
async fn stock_level(world: &mut CheckoutWorld, product_id: i64, qty: i64) {
    world.api().db().set_stock(product_id, qty).await.expect("Error setting stock");
}

#[given("the payment gateway is unavailable")]
async fn gateway_down(world: &mut CheckoutWorld) {
    let err = pix_payment_engine::GatewayError::Unavailable("connection refused".into());
    world.gateway().fail_charge_creation(Some(err));
}
