//! Data types that are stored in, or read from, the checkout database.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use pix_common::Cents;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The PIX charge has been created and the buyer has not paid yet.
    Pending,
    /// The gateway has confirmed that the money was received.
    Paid,
    /// The charge was rejected, cancelled, refunded, or the buyer cancelled the order.
    Canceled,
}

impl OrderStatusType {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Paid => write!(f, "paid"),
            OrderStatusType::Canceled => write!(f, "canceled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "canceled" => Ok(Self::Canceled),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------      CheckoutId       ---------------------------------------------------------
/// The locally generated reference for a checkout. It is sent to the gateway as the charge's external reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct CheckoutId(pub String);

impl From<String> for CheckoutId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for CheckoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl CheckoutId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      PaymentId        ---------------------------------------------------------
/// The gateway's identifier for a PIX charge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct PaymentId(pub String);

impl From<String> for PaymentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PaymentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PaymentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub status: OrderStatusType,
    pub total_amount: Cents,
    pub currency: String,
    pub checkout_id: CheckoutId,
    pub payment_id: PaymentId,
    pub qr_code: Option<String>,
    pub qr_code_base64: Option<String>,
    pub pix_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_amount: Cents,
    pub subtotal_amount: Cents,
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
/// Everything needed to persist a checkout once the gateway has accepted the charge.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: i64,
    pub total_amount: Cents,
    pub currency: String,
    pub checkout_id: CheckoutId,
    pub payment_id: PaymentId,
    pub qr_code: Option<String>,
    pub qr_code_base64: Option<String>,
    pub pix_expires_at: Option<DateTime<Utc>>,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_amount: Cents,
}

impl NewOrderItem {
    pub fn new(product_id: i64, quantity: i64, unit_amount: Cents) -> Self {
        Self { product_id, quantity, unit_amount }
    }

    /// `None` if the line's total does not fit in an `i64` number of cents.
    pub fn subtotal(&self) -> Option<Cents> {
        self.unit_amount.checked_mul(self.quantity)
    }
}

//--------------------------------------     PaymentUpdate     ---------------------------------------------------------
/// The fields of an order that follow the gateway's view of a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUpdate {
    pub status: OrderStatusType,
    pub qr_code: Option<String>,
    pub qr_code_base64: Option<String>,
    pub pix_expires_at: Option<DateTime<Utc>>,
}

//--------------------------------------    InventoryRecord    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: i64,
    pub product_id: i64,
    pub qty_on_hand: i64,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       Customer        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub email: Option<String>,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}
