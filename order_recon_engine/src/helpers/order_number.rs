use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

use crate::db_types::OrderNumber;

pub const DEFAULT_ORDER_PREFIX: &str = "ORD";

/// Generates a human-readable order number: `{prefix}-{unix millis}-{random suffix}`.
///
/// Uniqueness is by convention only. The timestamp makes collisions unlikely and the suffix
/// covers the same-millisecond case; the store never enforces anything.
pub fn new_order_number(prefix: &str) -> OrderNumber {
    let suffix: String = rand::thread_rng().sample_iter(&Alphanumeric).take(4).map(char::from).collect();
    OrderNumber::from(format!("{prefix}-{}-{}", Utc::now().timestamp_millis(), suffix.to_ascii_uppercase()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_numbers_carry_the_prefix() {
        let n = new_order_number("ORD");
        assert!(n.as_str().starts_with("ORD-"));
        assert_eq!(n.as_str().split('-').count(), 3);
    }

    #[test]
    fn order_numbers_differ_within_the_same_instant() {
        let a = new_order_number(DEFAULT_ORDER_PREFIX);
        let b = new_order_number(DEFAULT_ORDER_PREFIX);
        assert_ne!(a, b);
    }
}
