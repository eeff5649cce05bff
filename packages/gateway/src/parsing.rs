//! Date and cell parsing shared by the gateways.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses a Socrata datetime string (ISO 8601 with optional fractional
/// seconds), falling back to bare `YYYY-MM-DD` and `MM/DD/YYYY` dates.
#[must_use]
pub fn parse_socrata_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// Flattens a JSON object into string cells. Strings are kept verbatim,
/// numbers and booleans are rendered, nulls are dropped, and nested values
/// are kept as compact JSON.
#[must_use]
pub fn json_row(object: &serde_json::Map<String, serde_json::Value>) -> BTreeMap<String, String> {
    object
        .iter()
        .filter_map(|(key, value)| {
            let cell = match value {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), cell))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_socrata_date_with_fractional() {
        let dt = parse_socrata_date("2024-01-15T14:30:00.000").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00 UTC");
    }

    #[test]
    fn parses_socrata_date_without_fractional() {
        let dt = parse_socrata_date("2024-01-15T14:30:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00 UTC");
    }

    #[test]
    fn parses_date_only_forms() {
        let iso = parse_socrata_date("2022-07-04").unwrap();
        assert_eq!(iso.to_string(), "2022-07-04 00:00:00 UTC");
        let us = parse_socrata_date("07/04/2022").unwrap();
        assert_eq!(us, iso);
    }

    #[test]
    fn rejects_invalid_date() {
        assert!(parse_socrata_date("not-a-date").is_none());
        assert!(parse_socrata_date("").is_none());
    }

    #[test]
    fn flattens_json_cells() {
        let value = serde_json::json!({
            "violationid": "123",
            "bin": 3061234,
            "rentimpairing": null,
            "location": {"latitude": "40.7"}
        });
        let row = json_row(value.as_object().unwrap());
        assert_eq!(row["violationid"], "123");
        assert_eq!(row["bin"], "3061234");
        assert!(!row.contains_key("rentimpairing"));
        assert_eq!(row["location"], r#"{"latitude":"40.7"}"#);
    }
}
