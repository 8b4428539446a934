use std::time::Duration;

use cucumber::World;
use log::*;
use pix_payment_engine::{
    checkout_objects::{OrderWithItems, PixCheckoutResult},
    db_types::{Customer, Order},
    events::EventProducers,
    test_utils::{
        fake_gateway::FakeGateway,
        prepare_env::{create_database, random_db_path, run_migrations},
    },
    CheckoutApi,
    CheckoutError,
    PollerConfig,
    SqliteDatabase,
};

pub type TestCheckoutApi = CheckoutApi<SqliteDatabase, FakeGateway>;

#[derive(Default, Debug, World)]
pub struct CheckoutWorld {
    pub system: Option<CheckoutSystem>,
    pub last_checkout: Option<Result<PixCheckoutResult, CheckoutError>>,
    pub last_cancel: Option<Result<OrderWithItems, CheckoutError>>,
}

#[derive(Debug)]
pub struct CheckoutSystem {
    pub db_path: String,
    pub api: TestCheckoutApi,
    pub gateway: FakeGateway,
    pub customer: Customer,
    pub other_customer: Customer,
}

impl CheckoutWorld {
    pub fn system(&self) -> &CheckoutSystem {
        self.system.as_ref().expect("Checkout system not initialised")
    }

    pub fn api(&self) -> &TestCheckoutApi {
        &self.system().api
    }

    pub fn gateway(&self) -> &FakeGateway {
        &self.system().gateway
    }

    /// The order created by the last successful checkout
    pub fn checkout_order(&self) -> &Order {
        match &self.last_checkout {
            Some(Ok(result)) => &result.order,
            Some(Err(e)) => panic!("The last checkout failed: {e}"),
            None => panic!("No checkout has been made"),
        }
    }
}

impl CheckoutSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let customer = db.insert_customer(Some("alice@example.com"), Some("Alice")).await.expect("Error adding customer");
        let other_customer = db.insert_customer(None, Some("Bob")).await.expect("Error adding customer");
        let gateway = FakeGateway::new();
        let config = PollerConfig::new(Duration::from_millis(50), Duration::from_secs(5));
        let api = CheckoutApi::new(db, gateway.clone(), EventProducers::default()).with_poller_config(config);
        Self { db_path: url, api, gateway, customer, other_customer }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
