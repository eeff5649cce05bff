//! Per-category post-mapping and output rules.
//!
//! Each [`RecordCategory`] owns one [`CategoryRules`] entry. Gateways call
//! the `post_map` hook after mapping a row; [`to_output`] applies the
//! field omissions, renames, and hidden raw columns when a record is
//! serialized.

use serde_json::{Map, Value};

use crate::{DatasetRecord, RecordCategory};

/// Fallback text for complaints that carry neither a resolution nor a status.
pub const NO_RESOLUTION: &str = "No resolution";

/// Value used for derived fields whose source column is absent.
pub const UNKNOWN: &str = "Unknown";

/// Output label for the bedbug description column.
pub const INFESTED_UNITS_LABEL: &str = "Number of infested units";

/// Display and post-mapping rules for one category.
pub struct CategoryRules {
    /// Mutates a freshly mapped record.
    pub post_map: fn(&mut DatasetRecord),
    /// Top-level output keys removed for this category.
    pub omit: &'static [&'static str],
    /// Top-level output keys renamed for this category (`from`, `to`).
    pub renames: &'static [(&'static str, &'static str)],
    /// Raw columns left out of `additional_info`.
    pub hidden_columns: &'static [&'static str],
}

fn keep(_: &mut DatasetRecord) {}

/// Fills an empty resolution from the status, then from [`NO_RESOLUTION`].
fn fill_resolution(record: &mut DatasetRecord) {
    let has_note = record
        .resolution_note
        .as_deref()
        .is_some_and(|n| !n.trim().is_empty());
    if has_note {
        return;
    }
    let fallback = record
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_RESOLUTION);
    record.resolution_note = Some(fallback.to_string());
}

/// Replaces status/resolution with the three violation display fields.
fn derive_violation_fields(record: &mut DatasetRecord) {
    let current_status = record
        .raw_value("currentstatus")
        .unwrap_or(UNKNOWN)
        .to_string();

    let outstanding = match record.status.as_deref().map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case("open") => "Yes",
        Some(s) if s.eq_ignore_ascii_case("close") || s.eq_ignore_ascii_case("closed") => "No",
        _ => UNKNOWN,
    };

    let rent_impairing = match record.raw_value("rentimpairing") {
        Some(v) if v.eq_ignore_ascii_case("y") || v.eq_ignore_ascii_case("yes") => "Yes",
        Some(v) if v.eq_ignore_ascii_case("n") || v.eq_ignore_ascii_case("no") => "No",
        _ => UNKNOWN,
    };

    record
        .derived
        .insert("current_status".to_string(), current_status);
    record
        .derived
        .insert("is_outstanding".to_string(), outstanding.to_string());
    record
        .derived
        .insert("rent_impairing".to_string(), rent_impairing.to_string());

    record.status = None;
    record.resolution_note = None;
}

const LOCATION_COLUMNS: &[&str] = &[
    "latitude",
    "longitude",
    "bin",
    "bbl",
    "nta",
    "block",
    "lot",
];

static COMPLAINT_RULES: CategoryRules = CategoryRules {
    post_map: fill_resolution,
    omit: &[],
    renames: &[],
    hidden_columns: &[
        "agency",
        "incident_zip",
        "incident_address",
        "street_name",
        "cross_street_1",
        "cross_street_2",
        "intersection_street_1",
        "intersection_street_2",
        "address_type",
        "city",
        "landmark",
        "community_board",
        "borough",
        "x_coordinate_state_plane",
        "y_coordinate_state_plane",
        "open_data_channel_type",
        "park_facility_name",
        "park_borough",
        "location",
    ],
};

static LEAD_RULES: CategoryRules = CategoryRules {
    post_map: keep,
    omit: &[],
    renames: &[],
    hidden_columns: &[
        "buildingid",
        "registrationid",
        "boroid",
        "boro",
        "communityboard",
        "councildistrict",
        "censustract",
    ],
};

static BEDBUG_RULES: CategoryRules = CategoryRules {
    post_map: keep,
    omit: &[],
    renames: &[("description", INFESTED_UNITS_LABEL)],
    hidden_columns: &[
        "building_id",
        "registration_id",
        "borough",
        "house_number",
        "street_name",
        "postcode",
        "filling_period_end_date",
        "community_board",
        "city_council_district",
        "census_tract_2010",
    ],
};

static VIOLATION_RULES: CategoryRules = CategoryRules {
    post_map: derive_violation_fields,
    omit: &["status", "resolution_note"],
    renames: &[],
    hidden_columns: &[
        "housenumber",
        "lowhousenumber",
        "highhousenumber",
        "streetname",
        "streetcode",
        "zip",
        "buildingid",
        "registrationid",
        "boroid",
        "boro",
        "story",
        "novtype",
        "communityboard",
        "councildistrict",
        "censustract",
    ],
};

static NYCHA_RULES: CategoryRules = CategoryRules {
    post_map: keep,
    omit: &["resolution_note"],
    renames: &[],
    hidden_columns: &["borough", "zip_code", "house_number", "street_address"],
};

static RENT_STABILIZED_RULES: CategoryRules = CategoryRules {
    post_map: keep,
    omit: &["resolution_note", "date"],
    renames: &[],
    hidden_columns: &["zip", "street", "street1", "stsufx1", "city", "county"],
};

static LITIGATION_RULES: CategoryRules = CategoryRules {
    post_map: keep,
    omit: &[],
    renames: &[],
    hidden_columns: &[
        "buildingid",
        "boroid",
        "housenumber",
        "streetname",
        "zip",
        "community_district",
        "council_district",
        "census_tract",
    ],
};

impl RecordCategory {
    /// Returns the display and post-mapping rules for this category.
    #[must_use]
    pub fn rules(self) -> &'static CategoryRules {
        match self {
            Self::Complaint311 => &COMPLAINT_RULES,
            Self::LeadViolation => &LEAD_RULES,
            Self::BedbugReport => &BEDBUG_RULES,
            Self::HousingViolation => &VIOLATION_RULES,
            Self::NychaData => &NYCHA_RULES,
            Self::RentStabilized => &RENT_STABILIZED_RULES,
            Self::HousingLitigation => &LITIGATION_RULES,
        }
    }
}

/// Renders a record into its output JSON object.
#[must_use]
pub fn to_output(record: &DatasetRecord) -> Map<String, Value> {
    let rules = record.category.rules();

    let mut out = Map::new();
    out.insert("id".to_string(), Value::String(record.id.clone()));
    out.insert(
        "date".to_string(),
        record
            .date
            .map_or(Value::Null, |d| Value::String(d.to_rfc3339())),
    );
    out.insert(
        "category".to_string(),
        Value::String(record.category.to_string()),
    );
    out.insert(
        "type".to_string(),
        Value::String(record.category.label().to_string()),
    );
    out.insert(
        "description".to_string(),
        Value::String(record.description.clone()),
    );
    out.insert("status".to_string(), optional(record.status.as_deref()));
    out.insert(
        "resolution_note".to_string(),
        optional(record.resolution_note.as_deref()),
    );

    for (key, value) in &record.derived {
        out.insert(key.clone(), Value::String(value.clone()));
    }

    let additional: Map<String, Value> = record
        .raw
        .iter()
        .filter(|(k, _)| {
            !LOCATION_COLUMNS.contains(&k.as_str()) && !rules.hidden_columns.contains(&k.as_str())
        })
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    out.insert("additional_info".to_string(), Value::Object(additional));

    for key in rules.omit {
        out.remove(*key);
    }
    for (from, to) in rules.renames {
        if let Some(value) = out.remove(*from) {
            out.insert((*to).to_string(), value);
        }
    }

    out
}

fn optional(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation() -> DatasetRecord {
        let mut record = DatasetRecord::new(RecordCategory::HousingViolation, "12345");
        record.description = "REPAIR THE BROKEN PLASTER".to_string();
        record.status = Some("Open".to_string());
        record.resolution_note = Some("n/a".to_string());
        record
            .raw
            .insert("currentstatus".to_string(), "NOV SENT OUT".to_string());
        record
            .raw
            .insert("lowhousenumber".to_string(), "390".to_string());
        record
            .raw
            .insert("apartment".to_string(), "4B".to_string());
        record
    }

    #[test]
    fn complaint_resolution_falls_back_to_status() {
        let mut record = DatasetRecord::new(RecordCategory::Complaint311, "1");
        record.status = Some("Closed".to_string());
        record.resolution_note = Some("   ".to_string());
        record.apply_post_mapping();
        assert_eq!(record.resolution_note.as_deref(), Some("Closed"));
    }

    #[test]
    fn complaint_resolution_defaults_to_no_resolution() {
        let mut record = DatasetRecord::new(RecordCategory::Complaint311, "1");
        record.apply_post_mapping();
        assert_eq!(record.resolution_note.as_deref(), Some(NO_RESOLUTION));
    }

    #[test]
    fn complaint_keeps_existing_resolution() {
        let mut record = DatasetRecord::new(RecordCategory::Complaint311, "1");
        record.status = Some("Closed".to_string());
        record.resolution_note = Some("The inspector found no violation.".to_string());
        record.apply_post_mapping();
        assert_eq!(
            record.resolution_note.as_deref(),
            Some("The inspector found no violation.")
        );
    }

    #[test]
    fn violation_derives_fields_and_drops_status() {
        let mut record = violation();
        record.apply_post_mapping();

        assert!(record.status.is_none());
        assert!(record.resolution_note.is_none());
        assert_eq!(record.derived["current_status"], "NOV SENT OUT");
        assert_eq!(record.derived["is_outstanding"], "Yes");
        assert_eq!(record.derived["rent_impairing"], UNKNOWN);

        let out = to_output(&record);
        assert!(!out.contains_key("status"));
        assert!(!out.contains_key("resolution_note"));
        assert_eq!(out["rent_impairing"], "Unknown");
        let info = out["additional_info"].as_object().unwrap();
        assert!(info.contains_key("apartment"));
        assert!(!info.contains_key("lowhousenumber"));
    }

    #[test]
    fn violation_reads_rent_impairing_flag() {
        let mut record = violation();
        record.status = Some("Close".to_string());
        record
            .raw
            .insert("rentimpairing".to_string(), "Y".to_string());
        record.apply_post_mapping();
        assert_eq!(record.derived["is_outstanding"], "No");
        assert_eq!(record.derived["rent_impairing"], "Yes");
    }

    #[test]
    fn bedbug_description_is_relabeled() {
        let mut record = DatasetRecord::new(RecordCategory::BedbugReport, "77");
        record.description = "3".to_string();
        let out = to_output(&record);
        assert!(!out.contains_key("description"));
        assert_eq!(out[INFESTED_UNITS_LABEL], "3");
    }

    #[test]
    fn location_columns_are_hidden() {
        let mut record = DatasetRecord::new(RecordCategory::LeadViolation, "9");
        record
            .raw
            .insert("latitude".to_string(), "40.7".to_string());
        record.raw.insert("class".to_string(), "C".to_string());
        let out = to_output(&record);
        let info = out["additional_info"].as_object().unwrap();
        assert!(!info.contains_key("latitude"));
        assert_eq!(info["class"], "C");
    }
}
