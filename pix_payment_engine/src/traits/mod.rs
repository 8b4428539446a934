//! # Backend contracts
//!
//! This module defines the interfaces that the checkout engine needs from the outside world.
//!
//! ## Storage
//! * [`InventoryManagement`] is the stock ledger. Decrements are conditional, so stock can never go negative.
//! * [`OrderManagement`] reads orders and applies gateway status updates. Updates are idempotent.
//! * [`CustomerDirectory`] resolves the buyer that is placing an order.
//! * [`CheckoutDatabase`] ties these together and adds the one multi-table write the checkout flow needs: reserving
//!   stock and persisting the order in a single atomic transaction.
//!
//! ## Payment gateway
//! [`PixGateway`] creates PIX charges and reports their status. The gateway is the source of truth for whether money
//! has been received.
//!
//! All futures returned by these traits are `Send`, so that they can be driven from spawned tasks (e.g. the status
//! poller).
mod checkout_database;
mod customer_directory;
mod data_objects;
mod inventory_management;
mod order_management;
mod pix_gateway;

pub use checkout_database::CheckoutDatabase;
pub use customer_directory::{CustomerDirectory, CustomerError};
pub use data_objects::{ChargeCreated, ChargeStatus, NewCharge, StatusChange};
pub use inventory_management::{InventoryError, InventoryManagement};
pub use order_management::{OrderManagement, OrderStoreError};
pub use pix_gateway::{GatewayError, PixGateway};
