#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the lookup server.
//!
//! These are the JSON contract of `/api/*`. They are separate from the
//! record models so the wire shape can evolve independently.

use std::collections::BTreeMap;

use nyc_housing_record_models::{CategoryResult, CorrelatedResult, RecordCategory};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Query parameters for `/api/building-lookup`.
///
/// Everything is optional at this layer so validation errors come back as
/// JSON rather than as a framework rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildingLookupParams {
    /// Free-text street address.
    pub address: Option<String>,
    /// Five-digit ZIP code.
    pub zip_code: Option<String>,
    /// Entries per category: a positive integer or `all`.
    pub count: Option<String>,
    /// Category key or name.
    pub category: Option<String>,
}

/// Successful lookup response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiLookupResponse {
    /// Always `true`.
    pub success: bool,
    /// Results keyed by category.
    pub data: BTreeMap<RecordCategory, CategoryResult>,
    /// Distinct `"lat, lon"` pairs.
    pub unique_locations: Vec<String>,
}

impl From<CorrelatedResult> for ApiLookupResponse {
    fn from(result: CorrelatedResult) -> Self {
        Self {
            success: true,
            data: result.by_category,
            unique_locations: result.unique_locations.into_iter().collect(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Always `false`.
    pub success: bool,
    /// User-facing message.
    pub error: String,
}

impl ApiError {
    /// Wraps a message.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// One entry of `/api/datasets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDataset {
    /// Dataset id.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Category key.
    pub category: RecordCategory,
    /// Row cap per query.
    pub limit: u32,
    /// Whether rows cover house-number ranges.
    pub range_keyed: bool,
    /// Whether this server built a gateway for it.
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use nyc_housing_record_models::{BuildingIdentifier, DatasetRecord, LookupMetadata};

    use super::*;

    fn metadata() -> LookupMetadata {
        LookupMetadata {
            address: "393 Hewes St".to_string(),
            zip: "11211".to_string(),
            borough: None,
            building_identifier: BuildingIdentifier::unresolved(None),
        }
    }

    #[test]
    fn empty_result_shape() {
        let response = ApiLookupResponse::from(CorrelatedResult::empty(metadata()));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"success": true, "data": {}, "unique_locations": []})
        );
    }

    #[test]
    fn categories_serialize_with_entries_and_total() {
        let mut result = CorrelatedResult::empty(metadata());
        result.by_category.insert(
            RecordCategory::HousingViolation,
            CategoryResult::truncated(
                vec![
                    DatasetRecord::new(RecordCategory::HousingViolation, "1"),
                    DatasetRecord::new(RecordCategory::HousingViolation, "2"),
                ],
                Some(1),
            ),
        );
        result.unique_locations.insert("40.7081, -73.9571".to_string());

        let json = serde_json::to_value(ApiLookupResponse::from(result)).unwrap();
        assert_eq!(json["data"]["housing_violations"]["total"], 2);
        assert_eq!(
            json["data"]["housing_violations"]["entries"]
                .as_array()
                .unwrap()
                .len(),
            1
        );
        assert_eq!(json["unique_locations"][0], "40.7081, -73.9571");
    }

    #[test]
    fn error_shape() {
        assert_eq!(
            serde_json::to_value(ApiError::new("Invalid parameter 'zip_code': is required")).unwrap(),
            serde_json::json!({"success": false, "error": "Invalid parameter 'zip_code': is required"})
        );
    }
}
