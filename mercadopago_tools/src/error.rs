use thiserror::Error;

#[derive(Debug, Error)]
pub enum MercadoPagoApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The Mercado Pago access token has not been configured")]
    MissingAccessToken,
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Payment {0} does not exist")]
    NotFound(String),
    #[error("'{0}' is not a Mercado Pago payment id")]
    InvalidPaymentId(String),
    #[error("Mercado Pago returned a payment without an id")]
    EmptyResponse,
}

impl MercadoPagoApiError {
    /// True for failures that might go away if the same request is made again later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RestResponseError(_) => true,
            Self::QueryError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
