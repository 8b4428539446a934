use std::fmt::Debug;

use log::*;
use tokio::task::JoinHandle;

use crate::{
    db_types::{NewOrder, OrderStatusType, PaymentId},
    events::{EventProducers, OrderAnnulledEvent, OrphanedChargeEvent},
    helpers::{is_checkout_reference, is_terminal_status, new_checkout_reference},
    pix_api::{
        checkout_objects::{
            CheckoutRequest,
            NotificationOutcome,
            OrderWithItems,
            PaymentNotice,
            PixCheckoutResult,
            PixPaymentDetails,
        },
        errors::CheckoutError,
        reconciliation::Reconciler,
    },
    polling::{PollOutcome, PollRegistry, PollerConfig, StatusPoller},
    traits::{ChargeStatus, CheckoutDatabase, GatewayError, NewCharge, PixGateway},
};

/// `CheckoutApi` is the primary API for PIX checkouts.
///
/// It creates the charge at the gateway, reserves stock and persists the order, and then keeps the order in step with
/// the gateway. Three channels feed status into orders, all through the same idempotent [`Reconciler`]:
/// * a background poller per payment, started when the checkout completes;
/// * gateway push notifications ([`Self::handle_notification`]);
/// * explicit refreshes ([`Self::refresh_payment`]).
pub struct CheckoutApi<B, G> {
    db: B,
    gateway: G,
    registry: PollRegistry,
    poller_config: PollerConfig,
    producers: EventProducers,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({} active pollers)", self.registry.len())
    }
}

impl<B, G> CheckoutApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        Self { db, gateway, registry: PollRegistry::new(), poller_config: PollerConfig::default(), producers }
    }

    /// Use a shared registry, e.g. so that the server can cancel every poller on shutdown.
    pub fn with_registry(mut self, registry: PollRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_poller_config(mut self, config: PollerConfig) -> Self {
        self.poller_config = config;
        self
    }

    pub fn registry(&self) -> &PollRegistry {
        &self.registry
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: CheckoutDatabase,
    G: PixGateway,
{
    fn reconciler(&self) -> Reconciler<B> {
        Reconciler::new(self.db.clone(), self.producers.clone())
    }

    fn poller(&self) -> StatusPoller<B, G> {
        StatusPoller::new(self.reconciler(), self.gateway.clone(), self.registry.clone(), self.poller_config)
    }

    /// Creates a PIX checkout.
    ///
    /// The steps are ordered so that a failure leaves as little behind as possible:
    /// 1. The request is validated and the buyer resolved.
    /// 2. Stock is checked, so that an obviously unfulfillable basket is rejected before a charge exists.
    /// 3. The charge is created at the gateway. If this fails, nothing has been reserved or stored.
    /// 4. Stock is decremented and the order stored, atomically. If this fails, the charge is orphaned: it is logged
    ///    and published as an [`OrphanedChargeEvent`] so that it can be reconciled by hand.
    /// 5. A poller is started for the payment.
    pub async fn create_checkout(&self, request: CheckoutRequest) -> Result<PixCheckoutResult, CheckoutError> {
        request.validate()?;
        let customer = self
            .db
            .fetch_customer(request.customer_id)
            .await?
            .ok_or(CheckoutError::CustomerNotFound(request.customer_id))?;
        let checkout_id = new_checkout_reference();
        debug!("🔄️ Starting checkout {checkout_id} for customer {} ({})", customer.id, request.total_amount);
        self.db.verify_availability(&request.items).await?;

        let charge = NewCharge {
            amount: request.total_amount,
            description: request.description.clone(),
            external_reference: checkout_id.clone(),
            payer_email: customer.email.clone(),
        };
        let created = self.gateway.create_charge(charge).await.map_err(|e| {
            warn!("🔄️ Gateway refused to create a charge for checkout {checkout_id}. {e}");
            e
        })?;
        debug!("🔄️ Checkout {checkout_id} has charge {} ({})", created.payment_id, created.status);

        let new_order = NewOrder {
            customer_id: customer.id,
            total_amount: request.total_amount,
            currency: request.currency(),
            checkout_id: checkout_id.clone(),
            payment_id: created.payment_id.clone(),
            qr_code: created.qr_code.clone(),
            qr_code_base64: created.qr_code_base64.clone(),
            pix_expires_at: created.expires_at,
            items: request.items.clone(),
        };
        let (mut order, items) = match self.db.insert_checkout_order(new_order).await {
            Ok(saved) => saved,
            Err(e) => {
                error!(
                    "🔄️ orphaned charge: payment {} for checkout {checkout_id} ({}, customer {}) exists at the \
                     gateway but its order could not be saved. {e}",
                    created.payment_id, request.total_amount, customer.id
                );
                let event = OrphanedChargeEvent {
                    checkout_id: checkout_id.clone(),
                    payment_id: created.payment_id.clone(),
                    customer_id: customer.id,
                    amount: request.total_amount,
                    reason: e.to_string(),
                };
                self.producers.publish_orphaned_charge(event).await;
                return Err(e.into());
            },
        };
        info!("🔄️ Checkout {checkout_id} saved as order {} awaiting payment {}", order.id, order.payment_id);

        let pix = PixPaymentDetails::from_created(checkout_id, &created);
        if is_terminal_status(&created.status) {
            // Nothing left to wait for
            let change = self.reconciler().reconcile_order(&order, &ChargeStatus::from(created)).await?;
            order = change.order;
        } else {
            self.start_polling(&order.payment_id);
        }
        Ok(PixCheckoutResult { order, items, pix })
    }

    /// Starts a background poller for the payment, unless one is already running.
    pub fn start_polling(&self, payment_id: &PaymentId) -> Option<JoinHandle<PollOutcome>> {
        self.poller().start(payment_id)
    }

    /// Asks the gateway for the payment's current status right now and brings the order up to date.
    ///
    /// The order is looked up first, so unknown payment ids fail without a gateway call.
    pub async fn refresh_payment(&self, payment_id: &PaymentId) -> Result<PixCheckoutResult, CheckoutError> {
        let order = self
            .db
            .fetch_order_by_payment_id(payment_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(format!("for payment {payment_id}")))?;
        let charge = self.gateway.get_charge(payment_id).await.map_err(|e| match e {
            GatewayError::NotFound(id) => CheckoutError::PaymentNotFound(id),
            e => CheckoutError::GatewayError(e),
        })?;
        let change = self.reconciler().reconcile_order(&order, &charge).await?;
        if is_terminal_status(&charge.status) && self.registry.cancel(payment_id) {
            debug!("🔄️ Refresh settled payment {payment_id}. Poller stopped");
        }
        let items = self.db.fetch_order_items(change.order.id).await?;
        let pix = PixPaymentDetails::from_status(&change.order, &charge);
        Ok(PixCheckoutResult { order: change.order, items, pix })
    }

    /// Processes a gateway push notification.
    ///
    /// Notifications are only a hint that something changed: the payment's status is always fetched from the gateway.
    /// Failures are logged and swallowed, since the gateway retries notifications and the poller is still running.
    pub async fn handle_notification(&self, notice: PaymentNotice) -> NotificationOutcome {
        let topic = notice.topic.as_deref().unwrap_or("unknown");
        let Some(payment_id) = notice.payment_id else {
            warn!("🪝️ Notification ({topic}) did not include a payment id. Ignoring it");
            return NotificationOutcome::MissingPaymentId;
        };
        debug!("🪝️ Notification ({topic}) for payment {payment_id}");
        let charge = match self.gateway.get_charge(&payment_id).await {
            Ok(charge) => charge,
            Err(e) => {
                warn!("🪝️ Could not fetch payment {payment_id} after a notification. {e}");
                return NotificationOutcome::GatewayUnavailable(payment_id);
            },
        };
        let order = match self.db.fetch_order_by_payment_id(&payment_id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                warn!("🪝️ Received a notification for payment {payment_id}, but there is no order for it");
                return NotificationOutcome::UnknownPayment(payment_id);
            },
            Err(e) => {
                error!("🪝️ Could not look up the order for payment {payment_id}. {e}");
                return NotificationOutcome::StoreFailure(payment_id);
            },
        };
        match self.reconciler().reconcile_order(&order, &charge).await {
            Ok(change) => {
                if is_terminal_status(&charge.status) && self.registry.cancel(&payment_id) {
                    debug!("🪝️ Notification settled payment {payment_id}. Poller stopped");
                }
                NotificationOutcome::from(&change)
            },
            Err(e) => {
                error!("🪝️ Could not update order {} from payment {payment_id}. {e}", order.id);
                NotificationOutcome::StoreFailure(payment_id)
            },
        }
    }

    /// Cancels a pending order on behalf of its owner. The reserved stock is returned and the poller stopped.
    ///
    /// The charge itself is left to expire at the gateway.
    pub async fn cancel_order(&self, order_id: i64, customer_id: i64) -> Result<OrderWithItems, CheckoutError> {
        let order = self.db.cancel_pending_order(order_id, customer_id).await?;
        info!("🔄️ Order {order_id} was canceled by customer {customer_id}");
        self.registry.cancel(&order.payment_id);
        let event = OrderAnnulledEvent::new(order.clone(), OrderStatusType::Pending);
        self.producers.publish_order_annulled(event).await;
        let items = self.db.fetch_order_items(order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    pub async fn fetch_order(&self, order_id: i64) -> Result<OrderWithItems, CheckoutError> {
        let order =
            self.db.fetch_order_by_id(order_id).await?.ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;
        let items = self.db.fetch_order_items(order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// Looks an order up by the reference that was sent to the gateway as the charge's external reference. This is
    /// how orphaned charges are matched against the store.
    pub async fn fetch_order_by_checkout_id(&self, checkout_id: &str) -> Result<OrderWithItems, CheckoutError> {
        if !is_checkout_reference(checkout_id) {
            return Err(CheckoutError::ValidationError(format!("'{checkout_id}' is not a checkout reference")));
        }
        let order = self
            .db
            .fetch_order_by_checkout_id(checkout_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(format!("for checkout {checkout_id}")))?;
        let items = self.db.fetch_order_items(order.id).await?;
        Ok(OrderWithItems { order, items })
    }
}
