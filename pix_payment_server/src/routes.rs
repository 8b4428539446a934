//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here awaits the engine, which does its database and
//! gateway work asynchronously, so workers stay free while a checkout waits on Mercado Pago.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use pix_payment_engine::{
    checkout_objects::{CheckoutRequest, NotificationOutcome},
    db_types::PaymentId,
    traits::{CheckoutDatabase, InventoryManagement, PixGateway},
    CheckoutApi,
    InventoryApi,
};

use crate::{
    config::ServerOptions,
    data_objects::{notice_from_webhook, CancelOrderRequest, StockLevel, StockUpdate, WebhookQuery},
    errors::ServerError,
    helpers::get_remote_ip,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(create_checkout => Post "/checkout/pix" impl CheckoutDatabase, PixGateway);
/// Route handler for new PIX checkouts.
///
/// The body is a [`CheckoutRequest`]. On success the response is `201 Created` with the stored order, its items and
/// the PIX details (QR code, copy-and-paste code, expiry) the buyer needs to pay.
///
/// Failures map to `400` (invalid request), `404` (unknown customer), `409` (not enough stock) and `502` (Mercado
/// Pago refused or could not be reached). Nothing is reserved when the checkout fails.
pub async fn create_checkout<B, G>(
    api: web::Data<CheckoutApi<B, G>>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PixGateway,
{
    let request = body.into_inner();
    debug!("💻️ Checkout request for customer {} ({})", request.customer_id, request.total_amount);
    let result = api.create_checkout(request).await.map_err(|e| {
        debug!("💻️ Checkout failed. {e}");
        e
    })?;
    info!("💻️ Order {} created, awaiting PIX payment {}", result.order.id, result.pix.payment_id);
    Ok(HttpResponse::Created().json(result))
}

route!(refresh_payment => Get "/checkout/pix/{payment_id}/refresh" impl CheckoutDatabase, PixGateway);
pub async fn refresh_payment<B, G>(
    path: web::Path<String>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PixGateway,
{
    let payment_id = PaymentId::from(path.into_inner());
    trace!("💻️ Refresh requested for payment {payment_id}");
    let result = api.refresh_payment(&payment_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

route!(cancel_order => Post "/checkout/orders/{order_id}/cancel" impl CheckoutDatabase, PixGateway);
pub async fn cancel_order<B, G>(
    path: web::Path<i64>,
    api: web::Data<CheckoutApi<B, G>>,
    body: web::Json<CancelOrderRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PixGateway,
{
    let order_id = path.into_inner();
    let CancelOrderRequest { customer_id } = body.into_inner();
    debug!("💻️ Customer {customer_id} asked to cancel order {order_id}");
    let result = api.cancel_order(order_id, customer_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(order_by_id => Get "/orders/{order_id}" impl CheckoutDatabase, PixGateway);
pub async fn order_by_id<B, G>(
    path: web::Path<i64>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PixGateway,
{
    let order_id = path.into_inner();
    trace!("💻️ Fetching order {order_id}");
    let result = api.fetch_order(order_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Inventory  ----------------------------------------------------
route!(get_stock => Get "/inventory/{product_id}" impl InventoryManagement);
pub async fn get_stock<B: InventoryManagement>(
    path: web::Path<i64>,
    api: web::Data<InventoryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    let record = api.stock_for_product(product_id).await?;
    Ok(HttpResponse::Ok().json(StockLevel { product_id, qty_on_hand: record.qty_on_hand }))
}

route!(set_stock => Put "/inventory/{product_id}" impl InventoryManagement);
pub async fn set_stock<B: InventoryManagement>(
    path: web::Path<i64>,
    api: web::Data<InventoryApi<B>>,
    body: web::Json<StockUpdate>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    let StockUpdate { qty_on_hand } = body.into_inner();
    let record = api.set_stock(product_id, qty_on_hand).await?;
    info!("💻️ Stock for product {product_id} set to {}", record.qty_on_hand);
    Ok(HttpResponse::Ok().json(StockLevel { product_id, qty_on_hand: record.qty_on_hand }))
}

//------------------------------------------   Mercado Pago webhook  ---------------------------------------------
route!(mercadopago_webhook => Post "/mercadopago" impl CheckoutDatabase, PixGateway);
/// Route handler for Mercado Pago payment notifications.
///
/// Notifications are only used as a hint that a payment changed: the payment's status is always fetched from
/// Mercado Pago before the order is touched. The response is always an empty `200 OK`, whatever happened, so that
/// Mercado Pago does not keep retrying notifications we have no use for.
pub async fn mercadopago_webhook<B, G>(
    req: HttpRequest,
    options: web::Data<ServerOptions>,
    api: web::Data<CheckoutApi<B, G>>,
    body: web::Bytes,
) -> HttpResponse
where
    B: CheckoutDatabase,
    G: PixGateway,
{
    let peer = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded);
    let query = WebhookQuery::from_query_string(req.query_string());
    let notice = notice_from_webhook(body.as_ref(), &query);
    info!(
        "💻️ Mercado Pago notification ({}) for payment {} from {}",
        notice.topic.as_deref().unwrap_or("no topic"),
        notice.payment_id.as_ref().map(|p| p.as_str()).unwrap_or("??"),
        peer.map(|ip| ip.to_string()).unwrap_or_else(|| "an unknown address".into())
    );
    match api.handle_notification(notice).await {
        NotificationOutcome::Reconciled { payment_id, status, changed: true } => {
            info!("💻️ Payment {payment_id} reconciled. The order is now {status}")
        },
        outcome => debug!("💻️ Notification handled: {outcome:?}"),
    }
    HttpResponse::Ok().finish()
}
