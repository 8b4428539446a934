//! An in-memory [`PixGateway`] with scriptable statuses and failures.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{Duration, Utc};
use log::*;

use crate::{
    db_types::PaymentId,
    traits::{ChargeCreated, ChargeStatus, GatewayError, NewCharge, PixGateway},
};

#[derive(Debug)]
struct GatewayState {
    next_id: u64,
    initial_status: String,
    charges: HashMap<PaymentId, ChargeStatus>,
    requests: Vec<NewCharge>,
    status_queries: usize,
    create_failure: Option<GatewayError>,
    status_failure: Option<GatewayError>,
}

impl Default for GatewayState {
    fn default() -> Self {
        Self {
            next_id: 1000,
            initial_status: "pending".into(),
            charges: HashMap::new(),
            requests: Vec::new(),
            status_queries: 0,
            create_failure: None,
            status_failure: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GatewayState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// The status new charges are created with. Defaults to `pending`.
    pub fn with_initial_status(self, status: &str) -> Self {
        self.lock().initial_status = status.to_string();
        self
    }

    /// Moves an existing charge to a new status, as if the buyer had paid (or the charge had expired).
    pub fn set_status(&self, payment_id: &PaymentId, status: &str) {
        let mut state = self.lock();
        match state.charges.get_mut(payment_id) {
            Some(charge) => charge.status = status.to_string(),
            None => {
                let charge = ChargeStatus {
                    payment_id: payment_id.clone(),
                    status: status.to_string(),
                    status_detail: None,
                    qr_code: None,
                    qr_code_base64: None,
                    expires_at: None,
                };
                state.charges.insert(payment_id.clone(), charge);
            },
        }
    }

    /// Makes the next charge reuse an earlier payment id, as a misbehaving gateway might.
    pub fn reuse_payment_id(&self, payment_id: u64) {
        self.lock().next_id = payment_id;
    }

    pub fn fail_charge_creation(&self, error: Option<GatewayError>) {
        self.lock().create_failure = error;
    }

    pub fn fail_status_queries(&self, error: Option<GatewayError>) {
        self.lock().status_failure = error;
    }

    /// Every charge request received, including those that failed.
    pub fn charge_requests(&self) -> Vec<NewCharge> {
        self.lock().requests.clone()
    }

    pub fn status_queries(&self) -> usize {
        self.lock().status_queries
    }
}

impl PixGateway for FakeGateway {
    async fn create_charge(&self, charge: NewCharge) -> Result<ChargeCreated, GatewayError> {
        let mut state = self.lock();
        state.requests.push(charge.clone());
        if let Some(e) = state.create_failure.clone() {
            return Err(e);
        }
        let id = state.next_id;
        state.next_id += 1;
        let payment_id = PaymentId::from(id.to_string());
        let created = ChargeCreated {
            payment_id: payment_id.clone(),
            status: state.initial_status.clone(),
            qr_code: Some(format!("00020126580014br.gov.bcb.pix{id}{}", charge.external_reference)),
            qr_code_base64: Some(format!("iVBORw0KGgo{id}")),
            expires_at: Some(Utc::now() + Duration::minutes(30)),
        };
        state.charges.insert(payment_id, ChargeStatus::from(created.clone()));
        trace!("💳️ Fake gateway created charge {id} for {}", charge.amount);
        Ok(created)
    }

    async fn get_charge(&self, payment_id: &PaymentId) -> Result<ChargeStatus, GatewayError> {
        let mut state = self.lock();
        state.status_queries += 1;
        if let Some(e) = state.status_failure.clone() {
            return Err(e);
        }
        state.charges.get(payment_id).cloned().ok_or_else(|| GatewayError::NotFound(payment_id.clone()))
    }
}
