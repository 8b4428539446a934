//! Event hooks for checkout lifecycle changes.
//!
//! Consumers register async callbacks in [`EventHooks`]. [`EventHandlers`] turns those into channel-backed handler
//! tasks, and hands out [`EventProducers`] that the engine uses to publish events. Publishing never blocks the
//! checkout flow on a failing consumer.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
