//! PIX Payment Engine
//!
//! The PIX Payment Engine takes a buyer's basket, creates a PIX charge for it at a payment gateway, reserves the stock,
//! and then keeps the resulting order consistent with the gateway until the payment settles. It is provider-agnostic:
//! the gateway and the storage backend are both plugged in through traits.
//!
//! The library is divided into these main sections:
//! 1. Backend contracts ([`mod@traits`]) and the SQLite backend ([`SqliteDatabase`]). The data types used by the
//!    database are defined in the [`mod@db_types`] module and are public.
//! 2. The public API ([`mod@pix_api`]). [`CheckoutApi`] runs the checkout flow and accepts status updates from the
//!    gateway; [`InventoryApi`] administers stock.
//! 3. Payment status polling ([`mod@polling`]). One background task per pending payment, tracked in a
//!    [`PollRegistry`].
//!
//! The engine also emits events (see [`mod@events`]) when orders are paid or annulled, and when a charge is orphaned.
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod pix_api;
pub mod polling;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use pix_api::{
    checkout_api::CheckoutApi,
    checkout_objects,
    errors::CheckoutError,
    inventory_api::InventoryApi,
    reconciliation::Reconciler,
};
pub use polling::{PollOutcome, PollRegistry, PollerConfig, StatusPoller};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    CheckoutDatabase,
    CustomerDirectory,
    GatewayError,
    InventoryError,
    InventoryManagement,
    OrderManagement,
    OrderStoreError,
    PixGateway,
};
