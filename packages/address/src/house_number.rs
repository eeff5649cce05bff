//! House-number helpers for range comparisons.
//!
//! Queens-style hyphenated numbers (`"99-15"`) compare as the integer with
//! the hyphen removed (`9915`), which preserves ordering within a block.

/// Converts a house number to an integer for range comparisons.
///
/// Hyphens are removed and the leading ASCII digits are parsed, so
/// `"99-15"` → `9915` and `"12A"` → `12`. Returns `None` when no leading
/// digits remain.
#[must_use]
pub fn house_number_value(house_number: &str) -> Option<u32> {
    let stripped: String = house_number.trim().chars().filter(|c| *c != '-').collect();
    let digits: String = stripped.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Returns `true` if `house_number` falls within `low..=high`.
///
/// Any side that cannot be parsed makes the check fail.
#[must_use]
pub fn in_range(house_number: &str, low: &str, high: &str) -> bool {
    match (
        house_number_value(house_number),
        house_number_value(low),
        house_number_value(high),
    ) {
        (Some(n), Some(lo), Some(hi)) => lo <= n && n <= hi,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_number() {
        assert_eq!(house_number_value("393"), Some(393));
    }

    #[test]
    fn hyphenated_number() {
        assert_eq!(house_number_value("99-15"), Some(9915));
    }

    #[test]
    fn letter_suffix() {
        assert_eq!(house_number_value("12A"), Some(12));
    }

    #[test]
    fn unparsable() {
        assert_eq!(house_number_value(""), None);
        assert_eq!(house_number_value("N/A"), None);
    }

    #[test]
    fn range_bounds_inclusive() {
        assert!(in_range("305", "300", "310"));
        assert!(in_range("300", "300", "310"));
        assert!(in_range("310", "300", "310"));
        assert!(!in_range("311", "300", "310"));
    }

    #[test]
    fn range_with_unparsable_bound_fails() {
        assert!(!in_range("305", "", "310"));
        assert!(!in_range("305", "300", "UNKNOWN"));
    }

    #[test]
    fn range_with_hyphenated_numbers() {
        assert!(in_range("99-15", "99-01", "99-25"));
        assert!(!in_range("99-35", "99-01", "99-25"));
    }
}
