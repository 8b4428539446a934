mod checkout_reference;
mod quantities;
mod status;

pub use checkout_reference::{is_checkout_reference, new_checkout_reference, CHECKOUT_REFERENCE_PREFIX};
pub use quantities::aggregate_quantities;
pub use status::{is_terminal_status, normalize_status, TERMINAL_GATEWAY_STATUSES};
