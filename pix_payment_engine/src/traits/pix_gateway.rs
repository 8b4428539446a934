use std::future::Future;

use thiserror::Error;

use crate::{
    db_types::PaymentId,
    traits::{ChargeCreated, ChargeStatus, NewCharge},
};

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway could not be reached: {0}")]
    Unavailable(String),
    #[error("The payment gateway rejected the request. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("The payment gateway does not know payment {0}")]
    NotFound(PaymentId),
    #[error("The payment gateway sent an invalid response: {0}")]
    InvalidResponse(String),
    #[error("The payment gateway client is misconfigured: {0}")]
    Configuration(String),
}

/// A PIX payment provider.
///
/// Implementations must not retry internally. Every `create_charge` call is a distinct attempt with its own
/// idempotency token, so retrying a checkout creates a new charge.
pub trait PixGateway: Clone + Send + Sync + 'static {
    fn create_charge(&self, charge: NewCharge) -> impl Future<Output = Result<ChargeCreated, GatewayError>> + Send;

    fn get_charge(&self, payment_id: &PaymentId) -> impl Future<Output = Result<ChargeStatus, GatewayError>> + Send;
}
