#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Record category taxonomy, building identifiers and correlated result
//! types.
//!
//! Every external dataset maps its rows into the shared [`DatasetRecord`]
//! shape tagged with a [`RecordCategory`]. Category-specific display rules
//! live in [`format`] and are selected by category, never by inspecting
//! record contents.

pub mod format;

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Category of a record returned by one of the external datasets.
///
/// `Display`/`AsRef<str>` yield the response key (e.g.
/// `"housing_violations"`). Parsing accepts either the response key or the
/// variant name, case-insensitively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum RecordCategory {
    /// 311 service requests filed against the address.
    #[serde(rename = "311_complaints", alias = "Complaint311")]
    #[strum(to_string = "311_complaints", serialize = "Complaint311")]
    Complaint311,
    /// Lead-based paint violations.
    #[serde(rename = "lead_violations", alias = "LeadViolation")]
    #[strum(to_string = "lead_violations", serialize = "LeadViolation")]
    LeadViolation,
    /// Bedbug infestation filings.
    #[serde(rename = "bedbug_reports", alias = "BedbugReport")]
    #[strum(to_string = "bedbug_reports", serialize = "BedbugReport")]
    BedbugReport,
    /// HPD housing maintenance code violations.
    #[serde(rename = "housing_violations", alias = "HousingViolation")]
    #[strum(to_string = "housing_violations", serialize = "HousingViolation")]
    HousingViolation,
    /// NYCHA development addresses.
    #[serde(rename = "nycha_data", alias = "NYCHAData", alias = "NychaData")]
    #[strum(to_string = "nycha_data", serialize = "NYCHAData")]
    NychaData,
    /// Rent-stabilization registry entries.
    #[serde(rename = "rent_stabilized", alias = "RentStabilized")]
    #[strum(to_string = "rent_stabilized", serialize = "RentStabilized")]
    RentStabilized,
    /// HPD housing litigation cases.
    #[serde(rename = "housing_litigation", alias = "HousingLitigation")]
    #[strum(to_string = "housing_litigation", serialize = "HousingLitigation")]
    HousingLitigation,
}

impl RecordCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Complaint311,
            Self::LeadViolation,
            Self::BedbugReport,
            Self::HousingViolation,
            Self::NychaData,
            Self::RentStabilized,
            Self::HousingLitigation,
        ]
    }

    /// Human-readable label used as the record `type` in output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Complaint311 => "311 Complaint",
            Self::LeadViolation => "Lead Violation",
            Self::BedbugReport => "Bedbug Report",
            Self::HousingViolation => "Housing Violation",
            Self::NychaData => "NYCHA Development",
            Self::RentStabilized => "Rent Stabilized Building",
            Self::HousingLitigation => "Housing Litigation",
        }
    }
}

/// One of the five NYC boroughs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Borough {
    /// Manhattan (borough code 1).
    Manhattan,
    /// The Bronx (borough code 2).
    Bronx,
    /// Brooklyn (borough code 3).
    Brooklyn,
    /// Queens (borough code 4).
    Queens,
    /// Staten Island (borough code 5).
    #[serde(rename = "Staten Island")]
    #[strum(to_string = "Staten Island", serialize = "StatenIsland")]
    StatenIsland,
}

impl Borough {
    /// Returns the numeric borough code used by NYC city agencies.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Manhattan => 1,
            Self::Bronx => 2,
            Self::Brooklyn => 3,
            Self::Queens => 4,
            Self::StatenIsland => 5,
        }
    }

    /// Upper-case borough name as stored by most open-data datasets.
    #[must_use]
    pub const fn upper(self) -> &'static str {
        match self {
            Self::Manhattan => "MANHATTAN",
            Self::Bronx => "BRONX",
            Self::Brooklyn => "BROOKLYN",
            Self::Queens => "QUEENS",
            Self::StatenIsland => "STATEN ISLAND",
        }
    }
}

/// Which resolver tier produced a [`BuildingIdentifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceTier {
    /// Operator-maintained override table.
    Hardcoded,
    /// Primary geocoding service.
    Primary,
    /// Secondary building-info service.
    #[strum(serialize = "fallback1")]
    #[serde(rename = "fallback1")]
    Fallback1,
    /// Open registry query.
    #[strum(serialize = "fallback2")]
    #[serde(rename = "fallback2")]
    Fallback2,
    /// Every tier failed; the identifier is unknown.
    #[strum(serialize = "none")]
    #[serde(rename = "none")]
    Unresolved,
}

/// Canonical NYC identifiers for one building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingIdentifier {
    /// Building Identification Number.
    pub bin: Option<String>,
    /// Borough-Block-Lot tax lot identifier.
    pub bbl: Option<String>,
    /// Borough the building is in, when known.
    pub borough: Option<Borough>,
    /// Tier that produced this identifier.
    pub source_tier: SourceTier,
}

impl BuildingIdentifier {
    /// The "identifier unknown" terminal state.
    #[must_use]
    pub const fn unresolved(borough: Option<Borough>) -> Self {
        Self {
            bin: None,
            bbl: None,
            borough,
            source_tier: SourceTier::Unresolved,
        }
    }

    /// Whether at least one of BIN or BBL is known.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.bin.is_some() || self.bbl.is_some()
    }
}

/// A single row from an external dataset mapped into the common shape.
///
/// `raw` keeps every source column that was not mapped into one of the
/// typed fields. `derived` holds display fields computed by the category's
/// post-mapping rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRecord {
    /// Source-specific record identifier.
    pub id: String,
    /// Primary date of the record (inspection, filing, creation...).
    pub date: Option<DateTime<Utc>>,
    /// Category of the dataset this record came from.
    pub category: RecordCategory,
    /// Short description.
    pub description: String,
    /// Source status value.
    pub status: Option<String>,
    /// Resolution text, when the source provides one.
    pub resolution_note: Option<String>,
    /// Unmapped source columns.
    pub raw: BTreeMap<String, String>,
    /// Display fields added by post-mapping rules.
    pub derived: BTreeMap<String, String>,
}

impl DatasetRecord {
    /// Creates a record with empty optional fields.
    #[must_use]
    pub fn new(category: RecordCategory, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: None,
            category,
            description: String::new(),
            status: None,
            resolution_note: None,
            raw: BTreeMap::new(),
            derived: BTreeMap::new(),
        }
    }

    /// Returns a non-empty raw column value.
    #[must_use]
    pub fn raw_value(&self, column: &str) -> Option<&str> {
        self.raw
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Returns `"lat, lon"` if the record carries a usable coordinate pair.
    ///
    /// Zero or unparseable coordinates are treated as missing.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        let lat = self.raw_value("latitude")?;
        let lon = self.raw_value("longitude")?;
        let lat_f = lat.parse::<f64>().ok()?;
        let lon_f = lon.parse::<f64>().ok()?;
        if lat_f == 0.0 || lon_f == 0.0 {
            return None;
        }
        Some(format!("{lat}, {lon}"))
    }

    /// Applies the category's post-mapping rule.
    pub fn apply_post_mapping(&mut self) {
        (self.category.rules().post_map)(self);
    }

    /// Output ordering: most recent first, undated last, ties by id.
    #[must_use]
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        match (a.date, b.date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.id.cmp(&b.id))
    }
}

impl Serialize for DatasetRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        format::to_output(self).serialize(serializer)
    }
}

/// Records for one category after correlation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryResult {
    /// Records kept after truncation.
    pub entries: Vec<DatasetRecord>,
    /// Number of records before truncation.
    pub total: usize,
}

impl CategoryResult {
    /// Builds a result from a sorted, filtered list and an optional limit.
    #[must_use]
    pub fn truncated(mut entries: Vec<DatasetRecord>, limit: Option<usize>) -> Self {
        let total = entries.len();
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Self { entries, total }
    }
}

/// Request context echoed alongside correlated results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupMetadata {
    /// Canonical form of the requested address.
    pub address: String,
    /// ZIP code supplied by the caller.
    pub zip: String,
    /// Borough of the address, when known.
    pub borough: Option<Borough>,
    /// Identifier resolved for the building.
    pub building_identifier: BuildingIdentifier,
}

/// Unified per-building result across every dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrelatedResult {
    /// Records grouped by category. Each record's `category` equals its key.
    pub by_category: BTreeMap<RecordCategory, CategoryResult>,
    /// Distinct `"lat, lon"` pairs found on the records.
    pub unique_locations: BTreeSet<String>,
    /// Request context.
    pub metadata: LookupMetadata,
}

impl CorrelatedResult {
    /// A result with no categories.
    #[must_use]
    pub const fn empty(metadata: LookupMetadata) -> Self {
        Self {
            by_category: BTreeMap::new(),
            unique_locations: BTreeSet::new(),
            metadata,
        }
    }

    /// Total number of records across all categories (pre-truncation).
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.by_category.values().map(|c| c.total).sum()
    }

    /// Restricts output to `category` (if any) and truncates every
    /// remaining category's entries to `limit` (if any). Totals are kept.
    #[must_use]
    pub fn restrict(mut self, category: Option<RecordCategory>, limit: Option<usize>) -> Self {
        if let Some(category) = category {
            self.by_category.retain(|key, _| *key == category);
        }
        if let Some(limit) = limit {
            for result in self.by_category.values_mut() {
                result.entries.truncate(limit);
            }
        }
        self
    }
}
