//! Webhook signature middleware for Actix Web.
//!
//! Mercado Pago signs its webhook calls with the application's webhook secret. The signature arrives in the
//! `x-signature` header as `ts=<unix time>,v1=<hex hmac>`, and covers the manifest
//! `id:<data.id>;request-id:<x-request-id>;ts:<ts>;` (see [`crate::helpers::signature_manifest`]).
//!
//! `data.id` is taken from the query string, where Mercado Pago puts it, or from the body when the query string has
//! none. Requests without a valid signature are refused with `403 Forbidden`. When no secret is configured, every
//! request is let through.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorBadRequest, ErrorForbidden},
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use mercadopago_tools::PaymentNotification;
use pix_common::Secret;

use crate::{
    data_objects::WebhookQuery,
    helpers::{verify_signature, WebhookSignature},
};

pub const SIGNATURE_HEADER: &str = "x-signature";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub struct WebhookSignatureFactory {
    // If None, then the middleware will not check the signature and always allow the call
    secret: Option<Secret<String>>,
}

impl WebhookSignatureFactory {
    pub fn new(secret: Option<Secret<String>>) -> Self {
        WebhookSignatureFactory { secret }
    }
}

impl<S, B> Transform<S, ServiceRequest> for WebhookSignatureFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = WebhookSignatureService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(WebhookSignatureService { secret: self.secret.clone(), service: Rc::new(service) }))
    }
}

pub struct WebhookSignatureService<S> {
    secret: Option<Secret<String>>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for WebhookSignatureService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.secret.as_ref().map(|s| s.reveal().clone());
        Box::pin(async move {
            let Some(secret) = secret else {
                trace!("🔐️ Webhook signature checks are disabled. Allowing request.");
                return service.call(req).await;
            };
            trace!("🔐️ Checking webhook signature");
            let signature = req
                .headers()
                .get(SIGNATURE_HEADER)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    warn!("🔐️ No signature found in webhook request. Denying access.");
                    ErrorForbidden("No webhook signature found.")
                })?
                .parse::<WebhookSignature>()
                .map_err(|e| {
                    warn!("🔐️ {e}. Denying access.");
                    ErrorForbidden("Malformed webhook signature.")
                })?;
            let request_id = req.headers().get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()).map(String::from);
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {:?}", e);
                ErrorBadRequest("Failed to extract request data.")
            })?;
            let query = WebhookQuery::from_query_string(req.query_string());
            let data_id = query.data_id.clone().or_else(|| {
                serde_json::from_slice::<PaymentNotification>(data.as_ref()).ok().and_then(|n| n.payment_id())
            });
            if verify_signature(&secret, &signature, data_id.as_deref(), request_id.as_deref()) {
                trace!("🔐️ Webhook signature check ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                warn!("🔐️ Invalid webhook signature for payment {data_id:?}. Denying access.");
                Err(ErrorForbidden("Invalid webhook signature."))
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
