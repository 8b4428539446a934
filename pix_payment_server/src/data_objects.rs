use mercadopago_tools::PaymentNotification;
use pix_payment_engine::checkout_objects::PaymentNotice;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CancelOrderRequest {
    pub customer_id: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StockUpdate {
    pub qty_on_hand: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub product_id: i64,
    pub qty_on_hand: i64,
}

/// Query parameters Mercado Pago adds to webhook calls, e.g. `?data.id=123&type=payment` or the older
/// `?id=123&topic=payment`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookQuery {
    #[serde(default, rename = "data.id")]
    pub data_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

impl WebhookQuery {
    pub fn from_query_string(query: &str) -> Self {
        actix_web::web::Query::<WebhookQuery>::from_query(query).map(|q| q.into_inner()).unwrap_or_default()
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.data_id.as_deref().or(self.id.as_deref()).filter(|s| !s.trim().is_empty())
    }
}

/// Builds a notice from whatever the webhook call carried. The body wins over the query string. An unreadable body
/// is treated as empty.
pub fn notice_from_webhook(body: &[u8], query: &WebhookQuery) -> PaymentNotice {
    let notification = serde_json::from_slice::<PaymentNotification>(body).unwrap_or_default();
    let payment_id = notification.payment_id().or_else(|| query.payment_id().map(String::from));
    let topic = notification
        .action
        .or(notification.notification_type)
        .or_else(|| query.notification_type.clone())
        .or_else(|| query.topic.clone());
    PaymentNotice::new(payment_id).with_topic(topic)
}
