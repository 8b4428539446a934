use serde::{Deserialize, Serialize};

use crate::db_types::{Cents, CheckoutId, Order, OrderStatusType, PaymentId};

/// The gateway confirmed that the order has been paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// The order was canceled, either by the gateway or by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAnnulledEvent {
    pub order: Order,
    pub previous_status: OrderStatusType,
}

impl OrderAnnulledEvent {
    pub fn new(order: Order, previous_status: OrderStatusType) -> Self {
        Self { order, previous_status }
    }
}

/// A charge exists at the gateway, but the order that should track it could not be saved. Someone has to reconcile it
/// by hand (or with a sweep keyed on the checkout id) and refund the buyer if they paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanedChargeEvent {
    pub checkout_id: CheckoutId,
    pub payment_id: PaymentId,
    pub customer_id: i64,
    pub amount: Cents,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    OrderPaid(OrderPaidEvent),
    OrderAnnulled(OrderAnnulledEvent),
    OrphanedCharge(OrphanedChargeEvent),
}
