use std::future::Future;

use thiserror::Error;

use crate::db_types::Customer;

#[derive(Debug, Clone, Error)]
pub enum CustomerError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CustomerError {
    fn from(e: sqlx::Error) -> Self {
        CustomerError::DatabaseError(e.to_string())
    }
}

/// Resolves buyers. Identity management lives elsewhere; checkout only needs to know that the buyer exists and where
/// to send the gateway's receipts.
pub trait CustomerDirectory {
    fn fetch_customer(&self, customer_id: i64) -> impl Future<Output = Result<Option<Customer>, CustomerError>> + Send;
}
