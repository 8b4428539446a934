//! Maps the gateway's vocabulary of payment statuses onto the three states an order can be in.
use crate::db_types::OrderStatusType;

/// Gateway statuses after which the payment will not change again on its own. Pollers stop once they see one.
pub const TERMINAL_GATEWAY_STATUSES: [&str; 7] =
    ["approved", "authorized", "rejected", "cancelled", "canceled", "charged_back", "refunded"];

/// Total, case-insensitive mapping from a gateway status to an order status. Anything unrecognised (including an
/// empty string) is treated as still pending.
pub fn normalize_status(gateway_status: &str) -> OrderStatusType {
    match gateway_status.trim().to_ascii_lowercase().as_str() {
        "approved" | "authorized" => OrderStatusType::Paid,
        "rejected" | "cancelled" | "canceled" | "charged_back" | "refunded" => OrderStatusType::Canceled,
        _ => OrderStatusType::Pending,
    }
}

pub fn is_terminal_status(gateway_status: &str) -> bool {
    let status = gateway_status.trim().to_ascii_lowercase();
    TERMINAL_GATEWAY_STATUSES.contains(&status.as_str())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn paid_statuses() {
        assert_eq!(normalize_status("approved"), OrderStatusType::Paid);
        assert_eq!(normalize_status("APPROVED"), OrderStatusType::Paid);
        assert_eq!(normalize_status(" authorized "), OrderStatusType::Paid);
    }

    #[test]
    fn canceled_statuses() {
        for s in ["rejected", "cancelled", "canceled", "charged_back", "Refunded"] {
            assert_eq!(normalize_status(s), OrderStatusType::Canceled, "{s}");
        }
    }

    #[test]
    fn everything_else_is_pending() {
        for s in ["pending", "in_process", "in_mediation", "", "   ", "approved!", "ok", "🚀️", "\u{0}"] {
            assert_eq!(normalize_status(s), OrderStatusType::Pending, "{s:?}");
        }
    }

    #[test]
    fn terminal_statuses_never_normalize_to_pending() {
        for s in TERMINAL_GATEWAY_STATUSES {
            assert!(is_terminal_status(s));
            assert_ne!(normalize_status(s), OrderStatusType::Pending);
        }
        assert!(is_terminal_status("Charged_Back"));
        assert!(!is_terminal_status("pending"));
        assert!(!is_terminal_status("in_process"));
        assert!(!is_terminal_status(""));
    }

    #[test]
    fn normalization_is_total_over_arbitrary_input() {
        let samples = (0u32..2000).map(|i| {
            let len = (i % 13) as usize;
            (0..len).map(|j| char::from_u32(32 + (i * 7 + j as u32 * 31) % 95).unwrap_or('x')).collect::<String>()
        });
        for s in samples {
            let status = normalize_status(&s);
            assert!(matches!(status, OrderStatusType::Pending | OrderStatusType::Paid | OrderStatusType::Canceled));
            if is_terminal_status(&s) {
                assert_ne!(status, OrderStatusType::Pending);
            }
        }
    }
}
