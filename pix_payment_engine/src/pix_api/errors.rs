use thiserror::Error;

use crate::{
    db_types::PaymentId,
    traits::{CustomerError, GatewayError, InventoryError, OrderStoreError},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Invalid checkout request: {0}")]
    ValidationError(String),
    #[error("Customer {0} does not exist")]
    CustomerNotFound(i64),
    #[error("Not enough stock for product {product_id}. Requested {requested}, but only {available} available")]
    InsufficientStock { product_id: i64, requested: i64, available: i64 },
    #[error("{0}")]
    GatewayError(#[from] GatewayError),
    #[error("Order {0} does not exist")]
    OrderNotFound(String),
    #[error("Payment {0} does not exist at the payment gateway")]
    PaymentNotFound(PaymentId),
    #[error("Customer {customer_id} may not modify order {order_id}")]
    Forbidden { order_id: i64, customer_id: i64 },
    #[error("Only pending orders can be canceled. Order {order_id} is {status}")]
    OrderNotPending { order_id: i64, status: String },
    #[error("Internal database error: {0}")]
    DatabaseError(String),
}

impl From<InventoryError> for CheckoutError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::InsufficientStock { product_id, requested, available } => {
                CheckoutError::InsufficientStock { product_id, requested, available }
            },
            InventoryError::InvalidQuantity(q) => CheckoutError::ValidationError(format!("Invalid quantity {q}")),
            e @ InventoryError::TooLarge(_) => CheckoutError::ValidationError(e.to_string()),
            InventoryError::ProductNotFound(id) => {
                CheckoutError::InsufficientStock { product_id: id, requested: 0, available: 0 }
            },
            InventoryError::DatabaseError(s) => CheckoutError::DatabaseError(s),
        }
    }
}

impl From<OrderStoreError> for CheckoutError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::DatabaseError(s) => CheckoutError::DatabaseError(s),
            OrderStoreError::OrderNotFound(id) => CheckoutError::OrderNotFound(id.to_string()),
            OrderStoreError::PaymentNotFound(id) => CheckoutError::OrderNotFound(format!("for payment {id}")),
            OrderStoreError::Forbidden { order_id, customer_id } => CheckoutError::Forbidden { order_id, customer_id },
            OrderStoreError::OrderNotPending { order_id, status } => {
                CheckoutError::OrderNotPending { order_id, status: status.to_string() }
            },
            OrderStoreError::Inventory(e) => e.into(),
        }
    }
}

impl From<CustomerError> for CheckoutError {
    fn from(e: CustomerError) -> Self {
        match e {
            CustomerError::DatabaseError(s) => CheckoutError::DatabaseError(s),
        }
    }
}
