use std::time::Duration;

use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use log::debug;
use pix_common::Secret;
use pix_payment_engine::{
    db_types::Customer,
    events::EventProducers,
    test_utils::{fake_gateway::FakeGateway, prepare_env::seeded_database},
    CheckoutApi,
    InventoryApi,
    PollRegistry,
    PollerConfig,
    SqliteDatabase,
};

use crate::{
    config::ServerOptions,
    middleware::WebhookSignatureFactory,
    routes::{
        health,
        CancelOrderRoute,
        CreateCheckoutRoute,
        GetStockRoute,
        MercadopagoWebhookRoute,
        OrderByIdRoute,
        RefreshPaymentRoute,
        SetStockRoute,
    },
    server::json_config,
};

pub struct TestSystem {
    pub db: SqliteDatabase,
    pub gateway: FakeGateway,
    pub registry: PollRegistry,
    pub customer: Customer,
    pub webhook_secret: Option<Secret<String>>,
}

impl TestSystem {
    pub async fn new(stock: &[(i64, i64)]) -> Self {
        let _ = env_logger::try_init();
        let (db, customer) = seeded_database(stock).await;
        Self { db, gateway: FakeGateway::new(), registry: PollRegistry::new(), customer, webhook_secret: None }
    }

    pub fn with_webhook_secret(mut self, secret: &str) -> Self {
        self.webhook_secret = Some(Secret::new(secret.to_string()));
        self
    }

    /// Pollers are slow enough here that only explicit refreshes and webhooks settle payments.
    fn checkout_api(&self) -> CheckoutApi<SqliteDatabase, FakeGateway> {
        CheckoutApi::new(self.db.clone(), self.gateway.clone(), EventProducers::default())
            .with_registry(self.registry.clone())
            .with_poller_config(PollerConfig::new(Duration::from_secs(60), Duration::from_secs(120)))
    }

    /// Sends the request through a fully configured app and returns the status and body.
    pub async fn send(&self, req: TestRequest) -> (StatusCode, String) {
        let webhook_scope = web::scope("/webhooks")
            .wrap(WebhookSignatureFactory::new(self.webhook_secret.clone()))
            .service(MercadopagoWebhookRoute::<SqliteDatabase, FakeGateway>::new());
        let app = App::new()
            .app_data(json_config())
            .app_data(web::Data::new(self.checkout_api()))
            .app_data(web::Data::new(InventoryApi::new(self.db.clone())))
            .app_data(web::Data::new(ServerOptions::default()))
            .service(health)
            .service(CreateCheckoutRoute::<SqliteDatabase, FakeGateway>::new())
            .service(RefreshPaymentRoute::<SqliteDatabase, FakeGateway>::new())
            .service(CancelOrderRoute::<SqliteDatabase, FakeGateway>::new())
            .service(OrderByIdRoute::<SqliteDatabase, FakeGateway>::new())
            .service(GetStockRoute::<SqliteDatabase>::new())
            .service(SetStockRoute::<SqliteDatabase>::new())
            .service(webhook_scope);
        let service = test::init_service(app).await;
        debug!("Making request");
        // Middleware failures come back as errors rather than responses
        let (status, bytes) = match test::try_call_service(&service, req.to_request()).await {
            Ok(res) => (res.status(), test::read_body(res).await),
            Err(e) => {
                let res = e.error_response();
                (res.status(), res.into_body().try_into_bytes().unwrap_or_default())
            },
        };
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn shutdown(&self) {
        self.registry.shutdown();
    }
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"))
}
