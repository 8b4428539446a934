//! # Payment status polling
//!
//! After a checkout, the order's payment is watched by a [`StatusPoller`] task until the gateway reports a terminal
//! status, a wall-clock timeout elapses, or something else (a webhook, a manual refresh, a customer cancellation)
//! settles the payment first and cancels the task.
//!
//! The [`PollRegistry`] is the single place that knows which payments are being watched. It guarantees that there is
//! at most one task per payment id.
mod poller;
mod registry;

pub use poller::{PollOutcome, PollerConfig, StatusPoller};
pub use registry::{PollHandle, PollRegistry, Registration};
