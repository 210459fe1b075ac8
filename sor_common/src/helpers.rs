/// Returns the trimmed string if it contains anything other than whitespace.
///
/// Identifier fields (payment ids, idempotency tokens) are only meaningful when they carry a
/// real value; an empty or whitespace-only field is treated the same as an absent one.
pub fn trimmed_non_empty(value: Option<&str>) -> Option<&str> {
    match value {
        Some(v) => {
            let v = v.trim();
            (!v.is_empty()).then_some(v)
        },
        None => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn whitespace_is_the_same_as_absent() {
        assert_eq!(trimmed_non_empty(None), None);
        assert_eq!(trimmed_non_empty(Some("")), None);
        assert_eq!(trimmed_non_empty(Some("   \t")), None);
        assert_eq!(trimmed_non_empty(Some("  pay_123 ")), Some("pay_123"));
    }
}
