use uuid::Uuid;

use crate::db_types::CheckoutId;

pub const CHECKOUT_REFERENCE_PREFIX: &str = "PIX-";
const REFERENCE_LEN: usize = 12;

/// Generates a fresh checkout reference, e.g. `PIX-3F2A9C0B7D1E`.
pub fn new_checkout_reference() -> CheckoutId {
    let uuid = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
    CheckoutId(format!("{CHECKOUT_REFERENCE_PREFIX}{}", &uuid[..REFERENCE_LEN]))
}

pub fn is_checkout_reference(s: &str) -> bool {
    s.strip_prefix(CHECKOUT_REFERENCE_PREFIX)
        .map(|r| r.len() == REFERENCE_LEN && r.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)))
        .unwrap_or(false)
}
