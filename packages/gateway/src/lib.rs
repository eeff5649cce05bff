#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset gateways for NYC open data.
//!
//! Each external dataset is reached through a [`DatasetGateway`]. Socrata
//! datasets share one config-driven implementation ([`socrata::SocrataGateway`])
//! described by an embedded TOML [`definition::DatasetDefinition`]; the
//! rent-stabilization registry is a local CSV queried in memory
//! ([`rent_stabilized::RentStabilizedGateway`]).

pub mod definition;
pub mod http;
pub mod parsing;
pub mod registry;
pub mod rent_stabilized;
pub mod socrata;

use async_trait::async_trait;
use nyc_housing_address::AddressVariantSet;
use nyc_housing_address::house_number::in_range;
use nyc_housing_query::{Clause, FieldLayout, FilterExpression, QueryError};
use nyc_housing_record_models::{BuildingIdentifier, DatasetRecord, RecordCategory};
use serde::Deserialize;

pub use registry::{GatewayConfig, all_datasets, build_gateways, enabled_datasets};

/// Default row cap per dataset query.
pub const DEFAULT_LIMIT: u32 = 1000;

/// Errors from a single dataset query. Never fatal to a lookup.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The filter could not be built or rendered.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// The response did not have the expected shape.
    #[error("Malformed response: {message}")]
    Malformed {
        /// What was wrong.
        message: String,
    },
}

/// Raw columns holding the low/high house-number bounds of a block-range
/// row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HouseRangeFields {
    /// Low bound column.
    pub low: String,
    /// High bound column.
    pub high: String,
}

impl HouseRangeFields {
    /// Whether `record`'s range covers `house_number`. Rows with a missing
    /// or unparsable bound never match.
    #[must_use]
    pub fn covers(&self, record: &DatasetRecord, house_number: &str) -> bool {
        match (record.raw_value(&self.low), record.raw_value(&self.high)) {
            (Some(low), Some(high)) => in_range(house_number, low, high),
            _ => false,
        }
    }
}

/// One query against a dataset.
#[derive(Debug, Clone)]
pub struct GatewayQuery {
    /// Row filter.
    pub filter: FilterExpression,
    /// Ordering override; `None` uses the dataset's newest-first order.
    pub order_by: Option<String>,
    /// Maximum number of rows.
    pub limit: u32,
    /// House number to check range rows against. Range-keyed datasets drop
    /// rows that do not cover it before applying `limit`.
    pub house_number: Option<String>,
}

impl GatewayQuery {
    /// A query with the default ordering and row cap.
    #[must_use]
    pub const fn new(filter: FilterExpression) -> Self {
        Self {
            filter,
            order_by: None,
            limit: DEFAULT_LIMIT,
            house_number: None,
        }
    }

    /// Restricts range rows to those covering `house_number`.
    #[must_use]
    pub fn with_house_number(mut self, house_number: impl Into<String>) -> Self {
        self.house_number = Some(house_number.into());
        self
    }
}

/// A queryable external dataset.
///
/// Implementations return records already mapped into [`DatasetRecord`],
/// post-mapped for their category, and ordered newest first.
#[async_trait]
pub trait DatasetGateway: Send + Sync {
    /// Unique dataset id (e.g. `"hpd_violations"`).
    fn id(&self) -> &str;

    /// Category every returned record carries.
    fn category(&self) -> RecordCategory;

    /// How the dataset encodes addresses.
    fn layout(&self) -> &FieldLayout;

    /// Range columns for block-level datasets.
    fn house_range(&self) -> Option<&HouseRangeFields> {
        None
    }

    /// Clauses added to every query (recency windows and the like).
    fn extra_clauses(&self) -> Vec<Clause> {
        Vec::new()
    }

    /// Builds this dataset's filter for an address.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the layout needs an unknown identifier or
    /// the variant set is empty.
    fn build_filter(
        &self,
        variants: &AddressVariantSet,
        zip: &str,
        building: &BuildingIdentifier,
    ) -> Result<FilterExpression, QueryError> {
        let filter = nyc_housing_query::build_filter(self.layout(), variants, zip, building)?;
        Ok(filter.and_all(self.extra_clauses()))
    }

    /// Runs a query.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, status, or decoding failures.
    async fn query(&self, query: &GatewayQuery) -> Result<Vec<DatasetRecord>, GatewayError>;
}
