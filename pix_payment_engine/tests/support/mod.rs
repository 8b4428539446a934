#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use pix_payment_engine::{
    checkout_objects::{CheckoutRequest, PixCheckoutResult},
    db_types::{Cents, Customer, NewOrderItem},
    events::EventProducers,
    test_utils::{fake_gateway::FakeGateway, prepare_env::seeded_database},
    CheckoutApi,
    PollerConfig,
    SqliteDatabase,
};

pub type TestApi = CheckoutApi<SqliteDatabase, FakeGateway>;

pub struct TestSystem {
    pub api: TestApi,
    pub gateway: FakeGateway,
    pub customer: Customer,
}

pub async fn setup(stock: &[(i64, i64)], config: PollerConfig, producers: EventProducers) -> TestSystem {
    setup_with_gateway(stock, config, producers, FakeGateway::new()).await
}

pub async fn setup_with_gateway(
    stock: &[(i64, i64)],
    config: PollerConfig,
    producers: EventProducers,
    gateway: FakeGateway,
) -> TestSystem {
    let (db, customer) = seeded_database(stock).await;
    let api = CheckoutApi::new(db, gateway.clone(), producers).with_poller_config(config);
    TestSystem { api, gateway, customer }
}

pub fn fast_polling(timeout_ms: u64) -> PollerConfig {
    PollerConfig::new(Duration::from_millis(20), Duration::from_millis(timeout_ms))
}

pub fn request(customer_id: i64, product_id: i64, qty: i64) -> CheckoutRequest {
    let unit = Cents::from(1000);
    CheckoutRequest::new(customer_id, unit * qty, vec![NewOrderItem::new(product_id, qty, unit)])
}

pub async fn checkout(sys: &TestSystem, product_id: i64, qty: i64) -> PixCheckoutResult {
    sys.api.create_checkout(request(sys.customer.id, product_id, qty)).await.expect("Error creating checkout")
}

#[derive(Default, Clone)]
pub struct HookCalled {
    called: Arc<AtomicUsize>,
}

impl HookCalled {
    pub fn called(&self) {
        let _ = self.called.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> usize {
        self.called.load(Ordering::Relaxed)
    }

    /// Waits up to a second for the hook to have been called `n` times.
    pub async fn wait_for(&self, n: usize) -> usize {
        for _ in 0..100 {
            if self.count() >= n {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.count()
    }
}
