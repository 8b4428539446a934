//! Writes the gateway's view of a payment into the order that tracks it.
//!
//! The poller, webhook notifications and manual refreshes all end up here. Deliveries may be duplicated or arrive in
//! any order, so reconciliation is idempotent: applying the same gateway status twice changes nothing the second
//! time, and side effects (stock returns, events) only happen on an actual status change.
use log::*;

use crate::{
    db_types::{Order, OrderStatusType, PaymentUpdate},
    events::{EventProducers, OrderAnnulledEvent, OrderPaidEvent},
    helpers::normalize_status,
    traits::{ChargeStatus, OrderManagement, OrderStoreError, StatusChange},
};

#[derive(Clone)]
pub struct Reconciler<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Reconciler<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> Reconciler<B>
where B: OrderManagement + Sync
{
    /// Looks up the order for the charge and reconciles it. Fails with [`OrderStoreError::PaymentNotFound`] if no
    /// order refers to the charge.
    pub async fn reconcile_payment(&self, charge: &ChargeStatus) -> Result<StatusChange, OrderStoreError> {
        let order = self
            .db
            .fetch_order_by_payment_id(&charge.payment_id)
            .await?
            .ok_or_else(|| OrderStoreError::PaymentNotFound(charge.payment_id.clone()))?;
        self.reconcile_order(&order, charge).await
    }

    pub async fn reconcile_order(&self, order: &Order, charge: &ChargeStatus) -> Result<StatusChange, OrderStoreError> {
        let update = PaymentUpdate {
            status: normalize_status(&charge.status),
            qr_code: charge.qr_code.clone(),
            qr_code_base64: charge.qr_code_base64.clone(),
            pix_expires_at: charge.expires_at,
        };
        trace!("🔄️ Reconciling order {} with gateway status '{}'", order.id, charge.status);
        let change = self.db.apply_payment_update(order.id, update).await?;
        if change.status_changed() {
            self.on_status_changed(&change).await;
        }
        Ok(change)
    }

    async fn on_status_changed(&self, change: &StatusChange) {
        use OrderStatusType::*;
        let order = &change.order;
        info!(
            "🔄️ Order {} (payment {}) moved from {} to {}",
            order.id, order.payment_id, change.previous_status, order.status
        );
        match (change.previous_status, order.status) {
            (Canceled, Paid) => warn!(
                "🔄️ Order {} was paid after it had been canceled. Its stock was already released, so it needs a \
                 manual review",
                order.id
            ),
            (Paid | Canceled, Pending) => {
                warn!("🔄️ The gateway reports payment {} as pending again after it had settled", order.payment_id)
            },
            _ => {},
        }
        match order.status {
            Paid => self.producers.publish_order_paid(OrderPaidEvent::new(order.clone())).await,
            Canceled => {
                let event = OrderAnnulledEvent::new(order.clone(), change.previous_status);
                self.producers.publish_order_annulled(event).await
            },
            Pending => {},
        }
    }
}
