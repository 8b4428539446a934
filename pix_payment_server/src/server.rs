use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use mercadopago_tools::MercadoPagoApi;
use pix_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    CheckoutApi,
    InventoryApi,
    PollRegistry,
    SqliteDatabase,
};

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::mercadopago::MercadoPagoGateway,
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
};

const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not migrate the database. {e}")))?;
    let api = MercadoPagoApi::new(config.mercadopago.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = MercadoPagoGateway::new(api);
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, default_hooks());
    let producers = handlers.producers();
    handlers.start_handlers();
    let registry = PollRegistry::new();
    let srv = create_server_instance(config, db, gateway, producers, registry.clone())?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    let cancelled = registry.shutdown();
    info!("💻️ Server stopped. {cancelled} payment pollers were cancelled");
    result
}

/// Hooks for the checkout lifecycle. For now these only log; downstream integrations (fulfilment, refunds) attach here.
fn default_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_paid(|ev| {
            Box::pin(async move {
                info!("📬️ Order {} ({}) has been paid", ev.order.id, ev.order.total_amount);
            })
        })
        .on_order_annulled(|ev| {
            Box::pin(async move {
                info!("📬️ Order {} was annulled. It was {}", ev.order.id, ev.previous_status);
            })
        })
        .on_orphaned_charge(|ev| {
            Box::pin(async move {
                error!(
                    "📬️ orphaned charge: payment {} (checkout {}, customer {}, {}) needs manual reconciliation. {}",
                    ev.payment_id, ev.checkout_id, ev.customer_id, ev.amount, ev.reason
                );
            })
        });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: MercadoPagoGateway,
    producers: EventProducers,
    registry: PollRegistry,
) -> Result<Server, ServerError> {
    let poller_config = config.poller;
    let options = ServerOptions::from_config(&config);
    let webhook_secret = config.webhook_secret.clone();
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(db.clone(), gateway.clone(), producers.clone())
            .with_registry(registry.clone())
            .with_poller_config(poller_config);
        let inventory_api = InventoryApi::new(db.clone());
        let webhook_scope = web::scope("/webhooks")
            .wrap(WebhookSignatureFactory::new(webhook_secret.clone()))
            .service(MercadopagoWebhookRoute::<SqliteDatabase, MercadoPagoGateway>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("pix::access_log"))
            .app_data(json_config())
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(inventory_api))
            .app_data(web::Data::new(options))
            .service(health)
            .service(CreateCheckoutRoute::<SqliteDatabase, MercadoPagoGateway>::new())
            .service(RefreshPaymentRoute::<SqliteDatabase, MercadoPagoGateway>::new())
            .service(CancelOrderRoute::<SqliteDatabase, MercadoPagoGateway>::new())
            .service(OrderByIdRoute::<SqliteDatabase, MercadoPagoGateway>::new())
            .service(GetStockRoute::<SqliteDatabase>::new())
            .service(SetStockRoute::<SqliteDatabase>::new())
            .service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies get the same `{"error": ...}` response as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into())
}
