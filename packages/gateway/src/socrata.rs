//! Socrata SODA gateway.
//!
//! One implementation serves every Socrata dataset: the filter renders to
//! `$where`, ordering to `$order`, and the row cap to `$limit`.
//!
//! Range-keyed datasets are filtered by street, not house number, so their
//! rows are read page by page with `$offset` and checked against the house
//! number before the row cap applies.

use std::future::Future;

use async_trait::async_trait;
use nyc_housing_query::{Clause, FieldLayout};
use nyc_housing_record_models::{DatasetRecord, RecordCategory};

use crate::definition::{DataSource, DatasetDefinition};
use crate::{DatasetGateway, GatewayError, GatewayQuery, HouseRangeFields, http, parsing};

/// Upper bound on pages read for one range-keyed query.
pub const MAX_RANGE_PAGES: u32 = 20;

/// Gateway for one Socrata dataset.
pub struct SocrataGateway {
    definition: DatasetDefinition,
    api_url: String,
    client: reqwest::Client,
    app_token: Option<String>,
}

impl SocrataGateway {
    /// Creates a gateway, or `None` if the definition is not Socrata-backed.
    #[must_use]
    pub fn new(
        definition: DatasetDefinition,
        client: reqwest::Client,
        app_token: Option<String>,
    ) -> Option<Self> {
        let DataSource::Socrata { api_url } = &definition.source else {
            return None;
        };
        let api_url = api_url.clone();
        Some(Self {
            definition,
            api_url,
            client,
            app_token,
        })
    }

    /// Rows requested per page.
    fn page_size(&self, query: &GatewayQuery) -> u32 {
        query.limit.min(self.definition.limit)
    }

    /// Query-string parameters for one page starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Query`] if the filter cannot be rendered.
    pub fn params(
        &self,
        query: &GatewayQuery,
        offset: u32,
    ) -> Result<Vec<(&'static str, String)>, GatewayError> {
        let mut params = Vec::with_capacity(4);
        if !query.filter.is_empty() {
            params.push(("$where", query.filter.to_soql()?));
        }
        params.push((
            "$order",
            query
                .order_by
                .clone()
                .unwrap_or_else(|| self.definition.fields.default_order()),
        ));
        params.push(("$limit", self.page_size(query).to_string()));
        if offset > 0 {
            params.push(("$offset", offset.to_string()));
        }
        Ok(params)
    }

    /// Fetches one page, returning the raw row count with the mapped
    /// records.
    async fn fetch_page(
        &self,
        query: &GatewayQuery,
        offset: u32,
    ) -> Result<(usize, Vec<DatasetRecord>), GatewayError> {
        let params = self.params(query, offset)?;

        log::debug!("{}: querying {} with {params:?}", self.definition.id, self.api_url);

        let mut request = self.client.get(&self.api_url).query(&params);
        if let Some(token) = &self.app_token {
            request = request.header("X-App-Token", token);
        }

        let body = http::send_json(request).await?;
        let rows = body.as_array().map_or(0, Vec::len);
        Ok((rows, self.parse_rows(&body)?))
    }

    /// Maps a response body into records, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Malformed`] if the body is not a JSON array.
    pub fn parse_rows(&self, body: &serde_json::Value) -> Result<Vec<DatasetRecord>, GatewayError> {
        let rows = body.as_array().ok_or_else(|| GatewayError::Malformed {
            message: format!("{}: expected a JSON array", self.definition.id),
        })?;

        let mut skipped = 0usize;
        let mut records: Vec<DatasetRecord> = rows
            .iter()
            .filter_map(|row| {
                let mapped = row.as_object().and_then(|object| {
                    self.definition
                        .fields
                        .map_row(self.definition.category, parsing::json_row(object))
                });
                if mapped.is_none() {
                    skipped += 1;
                }
                mapped
            })
            .collect();

        if skipped > 0 {
            log::debug!("{}: skipped {skipped} rows without an id", self.definition.id);
        }

        records.sort_by(DatasetRecord::newest_first);
        Ok(records)
    }
}

#[async_trait]
impl DatasetGateway for SocrataGateway {
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

    fn extra_clauses(&self) -> Vec<Clause> {
        self.definition
            .since
            .iter()
            .map(crate::definition::SinceFilter::clause)
            .collect()
    }

    async fn query(&self, query: &GatewayQuery) -> Result<Vec<DatasetRecord>, GatewayError> {
        let records = match (&self.definition.range, query.house_number.as_deref()) {
            (Some(range), Some(house_number)) => {
                collect_in_range(
                    &self.definition.id,
                    self.page_size(query),
                    MAX_RANGE_PAGES,
                    |offset| self.fetch_page(query, offset),
                    |record| range.covers(record, house_number),
                )
                .await?
            }
            _ => self.fetch_page(query, 0).await?.1,
        };

        log::debug!("{}: {} records", self.definition.id, records.len());

        Ok(records)
    }
}

/// Reads pages from `fetch` until `page_size` records pass `keep`, a short
/// page signals the end of the data, or `max_pages` pages have been read.
///
/// `fetch` receives the row offset and returns the raw row count of the
/// page with its mapped records. Output is newest first and at most
/// `page_size` long.
async fn collect_in_range<F, Fut>(
    dataset_id: &str,
    page_size: u32,
    max_pages: u32,
    mut fetch: F,
    keep: impl Fn(&DatasetRecord) -> bool,
) -> Result<Vec<DatasetRecord>, GatewayError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<(usize, Vec<DatasetRecord>), GatewayError>>,
{
    let limit = page_size as usize;
    let mut kept = Vec::new();
    let mut offset: u32 = 0;

    for page in 0..max_pages {
        let (rows, records) = fetch(offset).await?;
        kept.extend(records.into_iter().filter(|r| keep(r)));

        if kept.len() >= limit || rows < limit {
            break;
        }
        if page + 1 == max_pages {
            log::warn!(
                "{dataset_id}: stopped after {max_pages} pages, range rows past offset {} not checked",
                offset as usize + rows
            );
        }
        offset = offset.saturating_add(u32::try_from(rows).unwrap_or(u32::MAX));
    }

    kept.sort_by(DatasetRecord::newest_first);
    kept.truncate(limit);
    Ok(kept)
}
