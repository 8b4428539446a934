mod cents;
mod helpers;

pub mod op;
mod secret;

pub use cents::{Cents, CentsConversionError, DEFAULT_CURRENCY, MAX_CURRENCY_CODE_LEN};
pub use helpers::parse_boolean_flag;
pub use secret::Secret;
