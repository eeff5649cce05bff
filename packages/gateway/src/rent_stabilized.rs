//! Rent-stabilization registry gateway.
//!
//! The registry is a combined CSV of the DHCR borough building lists,
//! loaded once and shared read-only. Rows are keyed by lower-case header
//! names and queried in memory with the same filter expressions the
//! Socrata gateways render to `$where`.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use nyc_housing_query::FieldLayout;
use nyc_housing_record_models::{DatasetRecord, RecordCategory};

use crate::definition::DatasetDefinition;
use crate::{DatasetGateway, GatewayError, GatewayQuery, HouseRangeFields};

/// Synthetic column joining `street1` and `stsufx1` (`"HEWES ST"`).
pub const STREET_COLUMN: &str = "street";

/// Immutable in-memory registry rows.
#[derive(Debug, Default)]
pub struct RentStabilizedRegistry {
    rows: Vec<BTreeMap<String, String>>,
}

impl RentStabilizedRegistry {
    /// Loads the registry from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the file cannot be opened or has no
    /// header row.
    pub fn load(path: &Path) -> Result<Self, GatewayError> {
        let file = std::fs::File::open(path)?;
        let registry = Self::from_reader(file)?;
        log::info!(
            "Loaded {} rent-stabilized buildings from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Parses registry rows from any CSV source. Malformed rows are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Csv`] if the header row cannot be read.
    pub fn from_reader(reader: impl Read) -> Result<Self, GatewayError> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    log::trace!("  skipping malformed row: {e}");
                    continue;
                }
            };
            let mut row: BTreeMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.trim().to_string()))
                .filter(|(_, v)| !v.is_empty())
                .collect();
            complete_row(&mut row);
            rows.push(row);
        }

        Ok(Self { rows })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the registry has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Adds the synthetic street column and closes open-ended ranges: a row
/// with only `bldgno1` covers exactly that house number.
fn complete_row(row: &mut BTreeMap<String, String>) {
    let street = [row.get("street1"), row.get("stsufx1")]
        .into_iter()
        .flatten()
        .map(|s| s.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join(" ");
    if !street.is_empty() {
        row.insert(STREET_COLUMN.to_string(), street);
    }

    if !row.contains_key("bldgno2")
        && let Some(low) = row.get("bldgno1").cloned()
    {
        row.insert("bldgno2".to_string(), low);
    }
}

/// Gateway over a shared [`RentStabilizedRegistry`].
pub struct RentStabilizedGateway {
    definition: DatasetDefinition,
    registry: Arc<RentStabilizedRegistry>,
}

impl RentStabilizedGateway {
    /// Creates a gateway over a loaded registry.
    #[must_use]
    pub const fn new(definition: DatasetDefinition, registry: Arc<RentStabilizedRegistry>) -> Self {
        Self {
            definition,
            registry,
        }
    }
}

#[async_trait]
impl DatasetGateway for RentStabilizedGateway {
    fn id(&self) -> &str {
        &self.definition.id
    }

    fn category(&self) -> RecordCategory {
        self.definition.category
    }

    fn layout(&self) -> &FieldLayout {
        &self.definition.layout
    }

    fn house_range(&self) -> Option<&HouseRangeFields> {
        self.definition.range.as_ref()
    }

    async fn query(&self, query: &GatewayQuery) -> Result<Vec<DatasetRecord>, GatewayError> {
        let mut records: Vec<DatasetRecord> = self
            .registry
            .rows
            .iter()
            .filter(|row| query.filter.matches(row))
            .filter_map(|row| {
                self.definition
                    .fields
                    .map_row(self.definition.category, row.clone())
            })
            .collect();

        if let (Some(range), Some(house_number)) =
            (&self.definition.range, query.house_number.as_deref())
        {
            records.retain(|r| range.covers(r, house_number));
        }

        records.sort_by(DatasetRecord::newest_first);
        records.truncate(query.limit.min(self.definition.limit) as usize);

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use nyc_housing_query::{Clause, FilterExpression};

    use super::*;
    use crate::definition::parse_dataset_toml;

    const CSV: &str = "\
ZIP,BLDGNO1,STREET1,STSUFX1,BLDGNO2,STREET2,STSUFX2,CITY,COUNTY,STATUS1,STATUS2,STATUS3,BLOCK,LOT
11211,391,HEWES,ST,397,,,BROOKLYN,KINGS,MULTIPLE DWELLING A,,,2231,14
11211,500,HEWES,ST,,,,BROOKLYN,KINGS,MULTIPLE DWELLING A,421-A,,2240,3
10036,67,WEST 45TH,ST,,,,NEW YORK,NEW YORK,MULTIPLE DWELLING A,,,1261,21
";

    fn gateway() -> RentStabilizedGateway {
        let definition = parse_dataset_toml(include_str!("../datasets/rent_stabilized.toml")).unwrap();
        let registry = RentStabilizedRegistry::from_reader(CSV.as_bytes()).unwrap();
        RentStabilizedGateway::new(definition, Arc::new(registry))
    }

    #[test]
    fn loads_rows_with_lowercase_headers() {
        let registry = RentStabilizedRegistry::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.rows[0]["street"], "HEWES ST");
        assert_eq!(registry.rows[0]["block"], "2231");
    }

    #[test]
    fn single_building_rows_get_closed_range() {
        let registry = RentStabilizedRegistry::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(registry.rows[1]["bldgno2"], "500");
        assert_eq!(registry.rows[0]["bldgno2"], "397");
    }

    #[tokio::test]
    async fn queries_in_memory() {
        let gateway = gateway();
        let filter = FilterExpression::new()
            .and(Clause::is_in(STREET_COLUMN, ["HEWES ST", "HEWES STREET"]))
            .and(Clause::eq("zip", "11211"));
        let records = gateway.query(&GatewayQuery::new(filter)).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.category == RecordCategory::RentStabilized));
        assert_eq!(records[0].id, "2231-14");
        assert_eq!(records[0].description, "MULTIPLE DWELLING A");
        assert_eq!(gateway.house_range().unwrap().low, "bldgno1");
    }

    #[tokio::test]
    async fn range_check_runs_before_the_row_cap() {
        let mut csv = String::from("ZIP,BLDGNO1,STREET1,STSUFX1,BLDGNO2,STATUS1,BLOCK,LOT\n");
        for block in 1000..1150 {
            csv.push_str(&format!(
                "10025,{n},BROADWAY,,{n},MULTIPLE DWELLING A,{block},1\n",
                n = block + 1000
            ));
        }
        csv.push_str("10025,2700,BROADWAY,,2706,MULTIPLE DWELLING B,9999,1\n");

        let definition = parse_dataset_toml(include_str!("../datasets/rent_stabilized.toml")).unwrap();
        let registry = RentStabilizedRegistry::from_reader(csv.as_bytes()).unwrap();
        let gateway = RentStabilizedGateway::new(definition, Arc::new(registry));

        let filter = FilterExpression::new()
            .and(Clause::eq(STREET_COLUMN, "BROADWAY"))
            .and(Clause::eq("zip", "10025"));
        let records = gateway
            .query(&GatewayQuery::new(filter).with_house_number("2704"))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "9999-1");
        assert_eq!(records[0].description, "MULTIPLE DWELLING B");
    }

    #[tokio::test]
    async fn respects_limit() {
        let gateway = gateway();
        let mut query = GatewayQuery::new(FilterExpression::new());
        query.limit = 1;
        assert_eq!(gateway.query(&query).await.unwrap().len(), 1);
    }
}
