use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::MercadoPagoConfig,
    data_objects::{NewPixPayment, PaymentResponse},
    MercadoPagoApiError,
};

const IDEMPOTENCY_HEADER: &str = "X-Idempotency-Key";
/// Payment ids are 64-bit integers, so 20 digits is already generous.
const MAX_PAYMENT_ID_LEN: usize = 20;

fn is_payment_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_PAYMENT_ID_LEN && id.bytes().all(|b| b.is_ascii_digit())
}

/// A thin client over the parts of the Mercado Pago payments API used for PIX.
///
/// The client never retries. Every call to [`MercadoPagoApi::create_pix_payment`] carries a fresh idempotency key, so
/// retrying a failed call is the caller's decision and will create a new charge.
#[derive(Clone)]
pub struct MercadoPagoApi {
    config: MercadoPagoConfig,
    client: Arc<Client>,
}

impl MercadoPagoApi {
    pub fn new(config: MercadoPagoConfig) -> Result<Self, MercadoPagoApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| MercadoPagoApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &MercadoPagoConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        extra_headers: &[(&str, String)],
        body: Option<B>,
    ) -> Result<T, MercadoPagoApiError> {
        if !self.config.has_access_token() {
            return Err(MercadoPagoApiError::MissingAccessToken);
        }
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url).bearer_auth(self.config.access_token.reveal());
        for (name, value) in extra_headers {
            req = req.header(*name, value);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| MercadoPagoApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| MercadoPagoApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message =
                response.text().await.map_err(|e| MercadoPagoApiError::RestResponseError(e.to_string()))?;
            Err(MercadoPagoApiError::QueryError { status, message })
        }
    }

    /// Create a PIX charge. The configured notification URL is attached to the request when one is set.
    pub async fn create_pix_payment(&self, payment: NewPixPayment) -> Result<PaymentResponse, MercadoPagoApiError> {
        let payment = match payment.notification_url {
            Some(_) => payment,
            None => payment.with_notification_url(self.config.notification_url.clone()),
        };
        let idempotency_key = uuid::Uuid::new_v4().to_string();
        debug!(
            "💳️ Creating PIX payment for {} ({:.2}). Idempotency key {idempotency_key}",
            payment.external_reference, payment.transaction_amount
        );
        let headers = [(IDEMPOTENCY_HEADER, idempotency_key)];
        let result =
            self.rest_query::<PaymentResponse, NewPixPayment>(Method::POST, "/v1/payments", &headers, Some(payment))
                .await?;
        let id = result.id.ok_or(MercadoPagoApiError::EmptyResponse)?;
        info!("💳️ Created PIX payment {id} with status {}", result.status.as_deref().unwrap_or("unknown"));
        Ok(result)
    }

    /// Fetch a payment. Mercado Pago payment ids are numeric; anything else is refused without making a request.
    pub async fn get_payment(&self, payment_id: &str) -> Result<PaymentResponse, MercadoPagoApiError> {
        if !is_payment_id(payment_id) {
            warn!("💳️ Refusing to look up payment '{payment_id}'. It is not a valid payment id");
            return Err(MercadoPagoApiError::InvalidPaymentId(payment_id.to_string()));
        }
        let path = format!("/v1/payments/{payment_id}");
        debug!("💳️ Fetching payment {payment_id}");
        let result = self.rest_query::<PaymentResponse, ()>(Method::GET, &path, &[], None).await.map_err(|e| match e {
            MercadoPagoApiError::QueryError { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
                MercadoPagoApiError::NotFound(payment_id.to_string())
            },
            e => e,
        })?;
        if result.id.is_none() {
            return Err(MercadoPagoApiError::EmptyResponse);
        }
        trace!("💳️ Payment {payment_id} has status {}", result.status.as_deref().unwrap_or("unknown"));
        Ok(result)
    }
}
