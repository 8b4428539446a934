//! # PIX payment engine public API
//!
//! The `pix_api` module exposes the programmatic API for the PIX checkout engine.
//!
//! * [`checkout_api`] is the primary API. It creates PIX checkouts, keeps orders in step with the gateway (via polling,
//!   webhook notifications, and manual refreshes), and lets customers cancel pending orders.
//! * [`inventory_api`] reads and administers stock levels.
//! * [`reconciliation`] holds the one routine that writes gateway status into orders. Every path that learns about a
//!   payment's status goes through it.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits it needs, and
//! (for checkouts) a payment gateway.
//!
//! ```rust,ignore
//! use pix_payment_engine::{CheckoutApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = CheckoutApi::new(db, my_gateway, producers);
//! let result = api.create_checkout(request).await?;
//! println!("Pay with {}", result.pix.qr_code.unwrap_or_default());
//! ```
pub mod checkout_api;
pub mod checkout_objects;
pub mod errors;
pub mod inventory_api;
pub mod reconciliation;
