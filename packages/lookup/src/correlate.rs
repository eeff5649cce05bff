//! Record correlation: merges gateway outputs into one per-building
//! result.

use std::collections::{BTreeMap, BTreeSet};

use nyc_housing_address::{Address, borough::borough_from_zip};
use nyc_housing_gateway::HouseRangeFields;
use nyc_housing_record_models::{
    BuildingIdentifier, CategoryResult, CorrelatedResult, DatasetRecord, LookupMetadata,
    RecordCategory,
};

use crate::RecordCount;

/// Records returned by one gateway, with what the correlator needs to know
/// about that gateway.
#[derive(Debug, Clone)]
pub struct GatewayOutput {
    /// Dataset id, for log lines.
    pub dataset_id: String,
    /// Category the gateway serves.
    pub category: RecordCategory,
    /// Range columns when rows cover a span of house numbers.
    pub range: Option<HouseRangeFields>,
    /// Records, empty when the gateway failed or was skipped.
    pub records: Vec<DatasetRecord>,
}

impl GatewayOutput {
    /// An output with no records.
    #[must_use]
    pub const fn empty(
        dataset_id: String,
        category: RecordCategory,
        range: Option<HouseRangeFields>,
    ) -> Self {
        Self {
            dataset_id,
            category,
            range,
            records: Vec::new(),
        }
    }
}

/// Request context for a result.
#[must_use]
pub fn metadata(address: &Address, zip: &str, building: BuildingIdentifier) -> LookupMetadata {
    LookupMetadata {
        address: address.canonical(),
        zip: zip.to_string(),
        borough: building.borough.or_else(|| borough_from_zip(zip)),
        building_identifier: building,
    }
}

/// Merges gateway outputs into a [`CorrelatedResult`].
///
/// Range rows outside the address's house number are dropped, records are
/// deduplicated by id within their category and ordered newest first.
/// Every gateway's category appears in the output, even when empty.
/// `category` restricts output to one category; `count` truncates each
/// category's entries while `total` keeps the pre-truncation count.
#[must_use]
pub fn correlate(
    address: &Address,
    zip: &str,
    outputs: Vec<GatewayOutput>,
    building: BuildingIdentifier,
    count: RecordCount,
    category: Option<RecordCategory>,
) -> CorrelatedResult {
    let mut grouped: BTreeMap<RecordCategory, Vec<DatasetRecord>> = BTreeMap::new();

    for output in outputs {
        if category.is_some_and(|c| c != output.category) {
            continue;
        }
        let bucket = grouped.entry(output.category).or_default();

        let before = output.records.len();
        let kept: Vec<DatasetRecord> = match &output.range {
            Some(range) => output
                .records
                .into_iter()
                .filter(|r| range.covers(r, &address.house_number))
                .collect(),
            None => output.records,
        };
        if kept.len() < before {
            log::debug!(
                "{}: dropped {} rows outside house number {}",
                output.dataset_id,
                before - kept.len(),
                address.house_number
            );
        }

        for record in kept {
            if record.category == output.category {
                bucket.push(record);
            } else {
                log::warn!(
                    "{}: record {} has category {} but gateway serves {}",
                    output.dataset_id,
                    record.id,
                    record.category,
                    output.category
                );
            }
        }
    }

    let mut result = CorrelatedResult::empty(metadata(address, zip, building));

    for (key, mut records) in grouped {
        records.sort_by(DatasetRecord::newest_first);
        let mut seen = BTreeSet::new();
        records.retain(|r| seen.insert(r.id.clone()));

        result
            .unique_locations
            .extend(records.iter().filter_map(DatasetRecord::location));
        result
            .by_category
            .insert(key, CategoryResult::truncated(records, count.as_limit()));
    }

    result
}
