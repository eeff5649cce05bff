//! ZIP code → borough inference.
//!
//! The ranges are a best-effort heuristic carried over from the site's
//! lookup form. Brooklyn and Queens overlap at 11351; the first matching
//! row wins, so table order matters. Do not adjust without USPS data.

use nyc_housing_record_models::Borough;

/// Inclusive ZIP ranges per borough, checked in order.
const ZIP_RANGES: &[(Borough, u32, u32)] = &[
    (Borough::Manhattan, 10001, 10282),
    (Borough::Manhattan, 10292, 10292),
    (Borough::Bronx, 10451, 10475),
    (Borough::Brooklyn, 11201, 11256),
    (Borough::Brooklyn, 11351, 11351),
    (Borough::Queens, 11004, 11109),
    (Borough::Queens, 11351, 11697),
    (Borough::StatenIsland, 10301, 10314),
];

/// Returns `true` if `zip` is exactly five ASCII digits.
#[must_use]
pub fn is_valid_zip(zip: &str) -> bool {
    zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit())
}

/// Infers the borough for a five-digit ZIP code.
#[must_use]
pub fn borough_from_zip(zip: &str) -> Option<Borough> {
    let zip = zip.trim();
    if !is_valid_zip(zip) {
        return None;
    }
    let value: u32 = zip.parse().ok()?;
    ZIP_RANGES
        .iter()
        .find(|(_, lo, hi)| (*lo..=*hi).contains(&value))
        .map(|(borough, _, _)| *borough)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_borough() {
        assert_eq!(borough_from_zip("10036"), Some(Borough::Manhattan));
        assert_eq!(borough_from_zip("10292"), Some(Borough::Manhattan));
        assert_eq!(borough_from_zip("10458"), Some(Borough::Bronx));
        assert_eq!(borough_from_zip("11211"), Some(Borough::Brooklyn));
        assert_eq!(borough_from_zip("11375"), Some(Borough::Queens));
        assert_eq!(borough_from_zip("10314"), Some(Borough::StatenIsland));
    }

    #[test]
    fn overlap_resolves_to_first_row() {
        assert_eq!(borough_from_zip("11351"), Some(Borough::Brooklyn));
    }

    #[test]
    fn rejects_out_of_range_and_malformed() {
        assert_eq!(borough_from_zip("90210"), None);
        assert_eq!(borough_from_zip("1121"), None);
        assert_eq!(borough_from_zip("11211-1234"), None);
        assert_eq!(borough_from_zip("abcde"), None);
    }

    #[test]
    fn validates_zip_shape() {
        assert!(is_valid_zip("11211"));
        assert!(!is_valid_zip(""));
        assert!(!is_valid_zip("1121a"));
    }
}
