use std::collections::BTreeMap;

use crate::{db_types::NewOrderItem, traits::InventoryError};

/// Sums the requested quantities per product. Sorted by product id so that callers lock rows in a stable order.
///
/// Fails with [`InventoryError::TooLarge`] if a product's total does not fit in an `i64`.
pub fn aggregate_quantities(items: &[NewOrderItem]) -> Result<BTreeMap<i64, i64>, InventoryError> {
    let mut totals = BTreeMap::new();
    for item in items {
        let total = totals.entry(item.product_id).or_insert(0i64);
        *total = total.checked_add(item.quantity).ok_or(InventoryError::TooLarge(item.product_id))?;
    }
    Ok(totals)
}
