//! Config-driven dataset definition.
//!
//! [`DatasetDefinition`] captures everything dataset-specific in a
//! serializable config struct: where the rows live, how addresses are
//! encoded, and which columns feed the common [`DatasetRecord`] fields.

use std::collections::BTreeMap;

use nyc_housing_query::{Clause, FieldLayout};
use nyc_housing_record_models::{DatasetRecord, RecordCategory};
use serde::Deserialize;

use crate::HouseRangeFields;
use crate::parsing::parse_socrata_date;

/// A complete dataset definition, loaded from embedded TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g. `"hpd_violations"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Category of every record this dataset yields.
    pub category: RecordCategory,
    /// Whether lookups query this dataset.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Row cap per query.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Where rows come from.
    pub source: DataSource,
    /// How addresses are encoded.
    pub layout: FieldLayout,
    /// House-number range columns for block-level rows.
    pub range: Option<HouseRangeFields>,
    /// Lower bound applied to every query.
    pub since: Option<SinceFilter>,
    /// Column mappings.
    pub fields: FieldMap,
}

const fn default_enabled() -> bool {
    true
}

const fn default_limit() -> u32 {
    crate::DEFAULT_LIMIT
}

/// Where a dataset's rows come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSource {
    /// Socrata SODA endpoint (`$where`/`$order`/`$limit`).
    Socrata {
        /// Resource URL (e.g. `".../resource/wvxf-dwi5.json"`).
        api_url: String,
    },
    /// Local CSV registry supplied through configuration.
    LocalCsv,
}

/// `field >= value` applied to every query.
#[derive(Debug, Clone, Deserialize)]
pub struct SinceFilter {
    /// Column name.
    pub field: String,
    /// Inclusive lower bound.
    pub value: String,
}

impl SinceFilter {
    /// The clause form of this filter.
    #[must_use]
    pub fn clause(&self) -> Clause {
        Clause::gte(&self.field, &self.value)
    }
}

/// Maps dataset columns to [`DatasetRecord`] fields.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMap {
    /// Columns joined with `-` to form the record id.
    pub id: Vec<String>,
    /// Date column (also the ordering column).
    pub date: Option<String>,
    /// Description column.
    pub description: Option<String>,
    /// Status column.
    pub status: Option<String>,
    /// Resolution column.
    pub resolution: Option<String>,
}

impl FieldMap {
    /// Maps one row into a record. Columns feeding typed fields are moved
    /// out of the row; everything else stays in `raw`.
    ///
    /// Returns `None` if every id column is empty.
    #[must_use]
    pub fn map_row(
        &self,
        category: RecordCategory,
        mut row: BTreeMap<String, String>,
    ) -> Option<DatasetRecord> {
        let id = self
            .id
            .iter()
            .filter_map(|f| row.get(f).map(|v| v.trim()).filter(|v| !v.is_empty()))
            .collect::<Vec<_>>()
            .join("-");
        if id.is_empty() {
            return None;
        }

        let mut take = |field: Option<&String>| {
            field
                .and_then(|f| row.remove(f))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut record = DatasetRecord::new(category, id);
        record.date = take(self.date.as_ref()).and_then(|d| parse_socrata_date(&d));
        record.description = take(self.description.as_ref()).unwrap_or_default();
        record.status = take(self.status.as_ref());
        record.resolution_note = take(self.resolution.as_ref());
        record.raw = row;
        record.apply_post_mapping();

        Some(record)
    }

    /// Socrata `$order` value: newest first, then row id.
    #[must_use]
    pub fn default_order(&self) -> String {
        self.date
            .as_ref()
            .map_or_else(|| ":id".to_string(), |d| format!("{d} DESC, :id"))
    }
}

/// Parses a TOML string into a [`DatasetDefinition`].
///
/// # Errors
///
/// Returns an error string if the TOML is malformed.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn violation_fields() -> FieldMap {
        FieldMap {
            id: vec!["violationid".to_string()],
            date: Some("inspectiondate".to_string()),
            description: Some("novdescription".to_string()),
            status: Some("violationstatus".to_string()),
            resolution: None,
        }
    }

    #[test]
    fn maps_typed_fields_and_keeps_raw() {
        let record = violation_fields()
            .map_row(
                RecordCategory::HousingViolation,
                row(&[
                    ("violationid", "15734011"),
                    ("inspectiondate", "2023-03-14T00:00:00.000"),
                    ("novdescription", "REPAIR THE LEAKY FAUCET"),
                    ("violationstatus", "Open"),
                    ("lowhousenumber", "390"),
                    ("currentstatus", "NOV SENT OUT"),
                ]),
            )
            .unwrap();

        assert_eq!(record.id, "15734011");
        assert_eq!(record.description, "REPAIR THE LEAKY FAUCET");
        assert_eq!(
            record.date.unwrap().to_string(),
            "2023-03-14 00:00:00 UTC"
        );
        assert_eq!(record.raw["lowhousenumber"], "390");
        assert!(!record.raw.contains_key("novdescription"));
        assert_eq!(record.derived["is_outstanding"], "Yes");
        assert_eq!(record.derived["current_status"], "NOV SENT OUT");
    }

    #[test]
    fn joins_composite_ids() {
        let fields = FieldMap {
            id: vec!["building_id".to_string(), "filing_date".to_string()],
            date: Some("filing_date".to_string()),
            description: None,
            status: None,
            resolution: None,
        };
        let record = fields
            .map_row(
                RecordCategory::BedbugReport,
                row(&[("building_id", "801234"), ("filing_date", "2021-11-05")]),
            )
            .unwrap();
        assert_eq!(record.id, "801234-2021-11-05");
        assert!(record.date.is_some());
    }

    #[test]
    fn skips_rows_without_id() {
        assert!(
            violation_fields()
                .map_row(RecordCategory::HousingViolation, row(&[("violationid", " ")]))
                .is_none()
        );
    }

    #[test]
    fn default_order_is_newest_first() {
        assert_eq!(violation_fields().default_order(), "inspectiondate DESC, :id");
        let undated = FieldMap {
            date: None,
            ..violation_fields()
        };
        assert_eq!(undated.default_order(), ":id");
    }

    #[test]
    fn parses_definition_toml() {
        let def = parse_dataset_toml(
            r#"
            id = "lead_violations"
            name = "Lead"
            category = "LeadViolation"

            [source]
            type = "socrata"
            api_url = "https://example.test/resource/x.json"

            [layout]
            type = "split"
            street_name = "streetname"
            zip = "zip"

            [range]
            low = "lowhousenumber"
            high = "highhousenumber"

            [fields]
            id = ["violationid"]
            "#,
        )
        .unwrap();
        assert!(def.enabled);
        assert_eq!(def.limit, crate::DEFAULT_LIMIT);
        assert_eq!(def.category, RecordCategory::LeadViolation);
        assert!(def.range.is_some());
        assert!(matches!(def.source, DataSource::Socrata { .. }));
    }
}
