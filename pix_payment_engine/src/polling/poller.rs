use std::time::Duration;

use log::*;
use tokio::{task::JoinHandle, time::Instant};

use crate::{
    db_types::{OrderStatusType, PaymentId},
    helpers::{is_terminal_status, normalize_status},
    pix_api::reconciliation::Reconciler,
    polling::{PollHandle, PollRegistry, Registration},
    traits::{OrderManagement, OrderStoreError, PixGateway},
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Time between gateway queries. The first query happens one interval after the task starts.
    pub interval: Duration,
    /// Wall-clock limit on how long a payment is watched, regardless of how many queries were made.
    pub timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self { interval: DEFAULT_POLL_INTERVAL, timeout: DEFAULT_POLL_TIMEOUT }
    }
}

impl PollerConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// How a poll task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The gateway reported a terminal status, which has been written to the order.
    TerminalStatus(OrderStatusType),
    /// The timeout elapsed without a terminal status. The order is left as it is.
    TimedOut,
    /// Someone else settled the payment (or the server is shutting down).
    Cancelled,
}

#[derive(Debug)]
enum PollState {
    Scheduled,
    Running,
    Terminated(PollOutcome),
}

/// Starts poll tasks. Cheap to clone.
#[derive(Clone)]
pub struct StatusPoller<B, G> {
    reconciler: Reconciler<B>,
    gateway: G,
    registry: PollRegistry,
    config: PollerConfig,
}

impl<B, G> StatusPoller<B, G>
where
    B: OrderManagement + Clone + Send + Sync + 'static,
    G: PixGateway,
{
    pub fn new(reconciler: Reconciler<B>, gateway: G, registry: PollRegistry, config: PollerConfig) -> Self {
        Self { reconciler, gateway, registry, config }
    }

    pub fn registry(&self) -> &PollRegistry {
        &self.registry
    }

    pub fn config(&self) -> PollerConfig {
        self.config
    }

    /// Starts watching the payment on the tokio runtime.
    ///
    /// Returns `None`, and does nothing, if the payment is already being watched. Otherwise the returned handle
    /// resolves to the task's outcome once it has deregistered itself.
    pub fn start(&self, payment_id: &PaymentId) -> Option<JoinHandle<PollOutcome>> {
        match self.registry.register(payment_id) {
            Registration::AlreadyActive(_) => None,
            Registration::Started(handle) => {
                let task = PollTask {
                    handle,
                    reconciler: self.reconciler.clone(),
                    gateway: self.gateway.clone(),
                    registry: self.registry.clone(),
                    config: self.config,
                };
                Some(tokio::spawn(task.run()))
            },
        }
    }
}

struct PollTask<B, G> {
    handle: PollHandle,
    reconciler: Reconciler<B>,
    gateway: G,
    registry: PollRegistry,
    config: PollerConfig,
}

impl<B, G> PollTask<B, G>
where
    B: OrderManagement + Clone + Send + Sync + 'static,
    G: PixGateway,
{
    async fn run(self) -> PollOutcome {
        let payment_id = self.handle.payment_id.clone();
        let started = Instant::now();
        debug!("⏱️ Polling payment {payment_id} every {:?} for up to {:?}", self.config.interval, self.config.timeout);
        let mut state = PollState::Scheduled;
        let outcome = loop {
            state = match state {
                PollState::Scheduled => self.wait().await,
                PollState::Running => self.tick(started).await,
                PollState::Terminated(outcome) => break outcome,
            };
        };
        self.registry.deregister(&payment_id, self.handle.generation);
        match outcome {
            PollOutcome::TerminalStatus(status) => info!("⏱️ Payment {payment_id} settled as {status}"),
            PollOutcome::TimedOut => {
                info!("⏱️ Gave up polling payment {payment_id} after {:?}. It is still pending", started.elapsed())
            },
            PollOutcome::Cancelled => debug!("⏱️ Polling for payment {payment_id} cancelled"),
        }
        outcome
    }

    async fn wait(&self) -> PollState {
        tokio::select! {
            _ = self.handle.token().cancelled() => PollState::Terminated(PollOutcome::Cancelled),
            _ = tokio::time::sleep(self.config.interval) => PollState::Running,
        }
    }

    async fn tick(&self, started: Instant) -> PollState {
        let payment_id = &self.handle.payment_id;
        trace!("⏱️ Querying gateway for payment {payment_id}");
        let result = self.gateway.get_charge(payment_id).await;
        // A webhook or refresh may have settled the payment while we were waiting on the gateway.
        if self.handle.is_cancelled() {
            return PollState::Terminated(PollOutcome::Cancelled);
        }
        match result {
            // Only a terminal status that has been written ends the task. Otherwise try again next tick.
            Ok(charge) => match self.reconciler.reconcile_payment(&charge).await {
                Ok(change) => {
                    trace!("⏱️ Payment {payment_id} reconciled. Order is {}", change.order.status);
                    if is_terminal_status(&charge.status) {
                        return PollState::Terminated(PollOutcome::TerminalStatus(normalize_status(&charge.status)));
                    }
                },
                Err(OrderStoreError::PaymentNotFound(_)) => {
                    warn!("⏱️ Payment {payment_id} is being polled, but no order refers to it")
                },
                Err(e) => warn!("⏱️ Could not reconcile payment {payment_id}. Will try again. {e}"),
            },
            Err(e) => warn!("⏱️ Could not fetch status of payment {payment_id}. Will try again. {e}"),
        }
        if started.elapsed() >= self.config.timeout {
            PollState::Terminated(PollOutcome::TimedOut)
        } else {
            PollState::Scheduled
        }
    }
}
