use chrono::{DateTime, Utc};
use log::warn;
use pix_common::{DEFAULT_CURRENCY, MAX_CURRENCY_CODE_LEN};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Cents, CheckoutId, NewOrderItem, Order, OrderItem, OrderStatusType, PaymentId},
    helpers::aggregate_quantities,
    pix_api::errors::CheckoutError,
    traits::{ChargeCreated, ChargeStatus, StatusChange},
};

/// A buyer's request to pay for a basket with PIX.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_id: i64,
    pub total_amount: Cents,
    /// Defaults to BRL when absent or blank
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub items: Vec<NewOrderItem>,
}

impl CheckoutRequest {
    pub fn new(customer_id: i64, total_amount: Cents, items: Vec<NewOrderItem>) -> Self {
        Self { customer_id, total_amount, currency: None, description: None, items }
    }

    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = Some(currency.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn currency(&self) -> String {
        self.currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_ascii_uppercase()
    }

    /// Checks the request before anything is reserved or charged.
    ///
    /// A total that disagrees with the sum of the line subtotals is accepted, but logged.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if !self.total_amount.is_positive() {
            return Err(CheckoutError::ValidationError("The total amount must be greater than zero".into()));
        }
        if self.items.is_empty() {
            return Err(CheckoutError::ValidationError("A checkout needs at least one item".into()));
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity <= 0) {
            return Err(CheckoutError::ValidationError(format!(
                "Product {} has an invalid quantity: {}",
                item.product_id, item.quantity
            )));
        }
        if let Some(item) = self.items.iter().find(|i| i.unit_amount.value() < 0) {
            return Err(CheckoutError::ValidationError(format!(
                "Product {} has a negative unit amount",
                item.product_id
            )));
        }
        if self.currency().chars().count() > MAX_CURRENCY_CODE_LEN {
            return Err(CheckoutError::ValidationError(format!(
                "Currency codes are at most {MAX_CURRENCY_CODE_LEN} characters long"
            )));
        }
        aggregate_quantities(&self.items)?;
        let mut subtotal = Cents::default();
        for item in &self.items {
            subtotal = item.subtotal().and_then(|s| subtotal.checked_add(s)).ok_or_else(|| {
                CheckoutError::ValidationError(format!("The amounts for product {} are too large", item.product_id))
            })?;
        }
        if subtotal != self.total_amount {
            warn!(
                "🔄️ Checkout for customer {} has a total of {} but its items add up to {subtotal}",
                self.customer_id, self.total_amount
            );
        }
        Ok(())
    }
}

/// The PIX artifacts a buyer needs to pay, plus the gateway's latest status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixPaymentDetails {
    pub payment_id: PaymentId,
    pub checkout_id: CheckoutId,
    /// The raw gateway status
    pub status: String,
    pub qr_code: Option<String>,
    pub qr_code_base64: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl PixPaymentDetails {
    pub fn from_created(checkout_id: CheckoutId, charge: &ChargeCreated) -> Self {
        Self {
            payment_id: charge.payment_id.clone(),
            checkout_id,
            status: charge.status.clone(),
            qr_code: charge.qr_code.clone(),
            qr_code_base64: charge.qr_code_base64.clone(),
            expires_at: charge.expires_at,
        }
    }

    /// Gateway values win. Fields the gateway left out fall back to what the order has stored.
    pub fn from_status(order: &Order, charge: &ChargeStatus) -> Self {
        Self {
            payment_id: charge.payment_id.clone(),
            checkout_id: order.checkout_id.clone(),
            status: charge.status.clone(),
            qr_code: charge.qr_code.clone().or_else(|| order.qr_code.clone()),
            qr_code_base64: charge.qr_code_base64.clone().or_else(|| order.qr_code_base64.clone()),
            expires_at: charge.expires_at.or(order.pix_expires_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixCheckoutResult {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub pix: PixPaymentDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// A gateway push notification, reduced to what the engine needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentNotice {
    pub payment_id: Option<PaymentId>,
    /// The notification's topic or action, for logging
    pub topic: Option<String>,
}

impl PaymentNotice {
    pub fn new(payment_id: Option<String>) -> Self {
        let payment_id = payment_id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).map(PaymentId);
        Self { payment_id, topic: None }
    }

    pub fn with_topic(mut self, topic: Option<String>) -> Self {
        self.topic = topic;
        self
    }
}

/// What happened to a notification. Notifications never fail; this exists for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The notification did not name a payment
    MissingPaymentId,
    /// The gateway could not be asked about the payment
    GatewayUnavailable(PaymentId),
    /// The payment is not one of ours
    UnknownPayment(PaymentId),
    /// The order was brought up to date with the gateway
    Reconciled { payment_id: PaymentId, status: OrderStatusType, changed: bool },
    /// The order could not be updated
    StoreFailure(PaymentId),
}

impl From<&StatusChange> for NotificationOutcome {
    fn from(change: &StatusChange) -> Self {
        NotificationOutcome::Reconciled {
            payment_id: change.order.payment_id.clone(),
            status: change.order.status,
            changed: change.changed,
        }
    }
}
