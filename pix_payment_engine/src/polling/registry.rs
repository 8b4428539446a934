use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use log::*;
use tokio_util::sync::CancellationToken;

use crate::db_types::PaymentId;

/// A registered poll task.
#[derive(Debug, Clone)]
pub struct PollHandle {
    pub payment_id: PaymentId,
    pub started_at: DateTime<Utc>,
    /// Distinguishes successive tasks for the same payment id, so that a finished task can't deregister its successor.
    pub generation: u64,
    token: CancellationToken,
}

impl PollHandle {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug, Clone)]
pub enum Registration {
    /// A new task was registered. The caller is responsible for running it.
    Started(PollHandle),
    /// A task for this payment is already running. Nothing was changed.
    AlreadyActive(PollHandle),
}

#[derive(Debug, Default)]
struct RegistryState {
    tasks: HashMap<PaymentId, PollHandle>,
    next_generation: u64,
}

/// Tracks the active poll tasks, keyed by payment id. Cloning gives another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct PollRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl PollRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Critical sections never panic, but if one ever did the map is still consistent, so carry on with it.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, payment_id: &PaymentId) -> Registration {
        let mut state = self.lock();
        if let Some(existing) = state.tasks.get(payment_id) {
            trace!("⏱️ Payment {payment_id} is already being polled (generation {})", existing.generation);
            return Registration::AlreadyActive(existing.clone());
        }
        state.next_generation += 1;
        let handle = PollHandle {
            payment_id: payment_id.clone(),
            started_at: Utc::now(),
            generation: state.next_generation,
            token: CancellationToken::new(),
        };
        state.tasks.insert(payment_id.clone(), handle.clone());
        debug!("⏱️ Registered poller for payment {payment_id} (generation {})", handle.generation);
        Registration::Started(handle)
    }

    /// Cancels and removes the task for the payment. Returns false if there was no such task.
    pub fn cancel(&self, payment_id: &PaymentId) -> bool {
        let removed = self.lock().tasks.remove(payment_id);
        match removed {
            Some(handle) => {
                handle.token.cancel();
                debug!("⏱️ Poller for payment {payment_id} cancelled");
                true
            },
            None => false,
        }
    }

    /// Called by a task when it finishes. Only removes the entry if it still belongs to that task.
    pub fn deregister(&self, payment_id: &PaymentId, generation: u64) -> bool {
        let mut state = self.lock();
        match state.tasks.get(payment_id) {
            Some(handle) if handle.generation == generation => {
                state.tasks.remove(payment_id);
                trace!("⏱️ Poller for payment {payment_id} deregistered");
                true
            },
            _ => false,
        }
    }

    pub fn is_active(&self, payment_id: &PaymentId) -> bool {
        self.lock().tasks.contains_key(payment_id)
    }

    pub fn get(&self, payment_id: &PaymentId) -> Option<PollHandle> {
        self.lock().tasks.get(payment_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cancels every task. Returns the number of tasks that were cancelled.
    pub fn shutdown(&self) -> usize {
        let tasks = std::mem::take(&mut self.lock().tasks);
        let n = tasks.len();
        tasks.into_values().for_each(|h| h.token.cancel());
        info!("⏱️ Cancelled {n} payment pollers");
        n
    }
}
