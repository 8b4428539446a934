use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{Cents, CheckoutId, Order, OrderStatusType, PaymentId};

/// A request to the gateway for a new PIX charge.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCharge {
    pub amount: Cents,
    pub description: Option<String>,
    /// The checkout id. The gateway stores it as the charge's external reference.
    pub external_reference: CheckoutId,
    pub payer_email: Option<String>,
}

/// The gateway's answer to a new charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeCreated {
    pub payment_id: PaymentId,
    /// The raw gateway status, e.g. `pending`
    pub status: String,
    pub qr_code: Option<String>,
    pub qr_code_base64: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// The gateway's current view of an existing charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeStatus {
    pub payment_id: PaymentId,
    /// The raw gateway status, e.g. `approved`
    pub status: String,
    pub status_detail: Option<String>,
    pub qr_code: Option<String>,
    pub qr_code_base64: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ChargeCreated> for ChargeStatus {
    fn from(c: ChargeCreated) -> Self {
        Self {
            payment_id: c.payment_id,
            status: c.status,
            status_detail: None,
            qr_code: c.qr_code,
            qr_code_base64: c.qr_code_base64,
            expires_at: c.expires_at,
        }
    }
}

/// The result of applying a payment update to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub order: Order,
    pub previous_status: OrderStatusType,
    /// False if the update matched what was already stored, in which case nothing was written.
    pub changed: bool,
}

impl StatusChange {
    pub fn status_changed(&self) -> bool {
        self.changed && self.previous_status != self.order.status
    }
}
