mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;

pub use api::MercadoPagoApi;
pub use config::MercadoPagoConfig;
pub use data_objects::{
    NewPixPayment,
    NotificationData,
    Payer,
    PaymentNotification,
    PaymentResponse,
    PointOfInteraction,
    TransactionData,
    DEFAULT_DESCRIPTION,
    DEFAULT_PAYER_EMAIL,
};
pub use error::MercadoPagoApiError;
