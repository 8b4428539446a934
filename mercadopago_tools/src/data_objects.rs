use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_DESCRIPTION: &str = "Pagamento via Pix";
pub const DEFAULT_PAYER_EMAIL: &str = "cliente@example.com";
pub const PIX_PAYMENT_METHOD: &str = "pix";

//--------------------------------------   NewPixPayment     ---------------------------------------------------------
/// Request body for `POST /v1/payments`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPixPayment {
    pub transaction_amount: f64,
    pub description: String,
    pub payment_method_id: String,
    pub external_reference: String,
    pub payer: Payer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payer {
    pub email: String,
}

impl NewPixPayment {
    /// Build a PIX charge request. Blank descriptions and e-mails are replaced with the defaults Mercado Pago accepts.
    pub fn new(transaction_amount: f64, external_reference: &str) -> Self {
        Self {
            transaction_amount,
            description: DEFAULT_DESCRIPTION.to_string(),
            payment_method_id: PIX_PAYMENT_METHOD.to_string(),
            external_reference: external_reference.to_string(),
            payer: Payer { email: DEFAULT_PAYER_EMAIL.to_string() },
            notification_url: None,
        }
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        if let Some(d) = description.map(str::trim).filter(|d| !d.is_empty()) {
            self.description = d.to_string();
        }
        self
    }

    pub fn with_payer_email(mut self, email: Option<&str>) -> Self {
        if let Some(e) = email.map(str::trim).filter(|e| !e.is_empty()) {
            self.payer.email = e.to_string();
        }
        self
    }

    pub fn with_notification_url(mut self, url: Option<String>) -> Self {
        self.notification_url = url;
        self
    }
}

//--------------------------------------  PaymentResponse    ---------------------------------------------------------
/// The subset of Mercado Pago's payment resource that PIX checkouts care about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: Option<i64>,
    pub status: Option<String>,
    pub status_detail: Option<String>,
    pub external_reference: Option<String>,
    pub date_of_expiration: Option<String>,
    pub transaction_amount: Option<f64>,
    pub point_of_interaction: Option<PointOfInteraction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointOfInteraction {
    pub transaction_data: Option<TransactionData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionData {
    pub qr_code: Option<String>,
    pub qr_code_base64: Option<String>,
    pub ticket_url: Option<String>,
}

impl PaymentResponse {
    fn transaction_data(&self) -> Option<&TransactionData> {
        self.point_of_interaction.as_ref().and_then(|p| p.transaction_data.as_ref())
    }

    pub fn qr_code(&self) -> Option<&str> {
        self.transaction_data().and_then(|t| t.qr_code.as_deref())
    }

    pub fn qr_code_base64(&self) -> Option<&str> {
        self.transaction_data().and_then(|t| t.qr_code_base64.as_deref())
    }

    pub fn ticket_url(&self) -> Option<&str> {
        self.transaction_data().and_then(|t| t.ticket_url.as_deref())
    }
}

//-------------------------------------- PaymentNotification ---------------------------------------------------------
/// Body of a Mercado Pago webhook call, e.g. `{"id": 1, "type": "payment", "action": "payment.updated",
/// "data": {"id": "123"}}`. Ids arrive as numbers or strings depending on the notification version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentNotification {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "type")]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub data: Option<NotificationData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationData {
    #[serde(default)]
    pub id: Option<Value>,
}

impl PaymentNotification {
    /// The payment this notification refers to. `data.id` wins over the top-level `id`.
    pub fn payment_id(&self) -> Option<String> {
        self.data.as_ref().and_then(|d| id_as_string(d.id.as_ref())).or_else(|| id_as_string(self.id.as_ref()))
    }
}

fn id_as_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
