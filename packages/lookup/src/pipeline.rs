//! The end-to-end lookup pipeline.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use nyc_housing_address::{NormalizedAddress, normalize};
use nyc_housing_gateway::{DatasetGateway, GatewayConfig, GatewayQuery, build_gateways};
use nyc_housing_query::QueryError;
use nyc_housing_record_models::{BuildingIdentifier, CorrelatedResult};
use nyc_housing_resolver::overrides::OverrideTable;
use nyc_housing_resolver::{BuildingIdentifierResolver, ResolverConfig, build_resolver};

use crate::config::{DEFAULT_FALLBACK_TIMEOUT, DEFAULT_GATEWAY_TIMEOUT, USER_AGENT};
use crate::correlate::{GatewayOutput, correlate, metadata};
use crate::{FallbackOutcome, LookupConfig, LookupError, LookupRequest, NoFallback, ScrapeFallbackPort};

/// Address → correlated records.
///
/// Holds no per-request state; one instance serves every request.
pub struct BuildingLookup {
    resolver: BuildingIdentifierResolver,
    gateways: Vec<Arc<dyn DatasetGateway>>,
    fallback: Arc<dyn ScrapeFallbackPort>,
    gateway_timeout: Duration,
    fallback_timeout: Duration,
}

impl BuildingLookup {
    /// A pipeline with no fallback and the default gateway timeout.
    #[must_use]
    pub fn new(resolver: BuildingIdentifierResolver, gateways: Vec<Arc<dyn DatasetGateway>>) -> Self {
        Self {
            resolver,
            gateways,
            fallback: Arc::new(NoFallback),
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
            fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
        }
    }

    /// Replaces the fallback source.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn ScrapeFallbackPort>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sets the per-gateway timeout.
    #[must_use]
    pub const fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    /// Sets the fallback timeout. A fallback that does not answer in time
    /// counts as unavailable.
    #[must_use]
    pub const fn with_fallback_timeout(mut self, timeout: Duration) -> Self {
        self.fallback_timeout = timeout;
        self
    }

    /// Builds the gateways and resolver described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] if the HTTP client cannot be built or
    /// a configured override table cannot be loaded.
    pub fn from_config(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LookupError::Config(format!("Failed to build HTTP client: {e}")))?;

        let gateways = build_gateways(&GatewayConfig {
            client: client.clone(),
            app_token: config.socrata_app_token.clone(),
            rent_stabilized_csv: config.rent_stabilized_csv.clone(),
        });

        let overrides = config
            .overrides_path
            .as_deref()
            .map(OverrideTable::load)
            .transpose()
            .map_err(|e| LookupError::Config(e.to_string()))?;

        let resolver = build_resolver(&ResolverConfig {
            client,
            geoclient: config.geoclient.clone(),
            overrides,
            gateways: gateways.clone(),
        });

        Ok(Self::new(resolver, gateways)
            .with_gateway_timeout(config.gateway_timeout)
            .with_fallback_timeout(config.fallback_timeout))
    }

    /// Configured gateways.
    #[must_use]
    pub fn gateways(&self) -> &[Arc<dyn DatasetGateway>] {
        &self.gateways
    }

    /// Configured identifier resolver.
    #[must_use]
    pub const fn resolver(&self) -> &BuildingIdentifierResolver {
        &self.resolver
    }

    /// Runs one lookup.
    ///
    /// Gateways run concurrently, each under its own timeout; a failed or
    /// slow gateway contributes an empty category. If every gateway comes
    /// back empty the fallback is consulted under its own timeout, and an
    /// unavailable or slow fallback yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::AddressParse`] if the address cannot be
    /// parsed, or [`LookupError::InvalidParameter`] if it is blank.
    pub async fn lookup(&self, request: &LookupRequest) -> Result<CorrelatedResult, LookupError> {
        let normalized = normalize(&request.address)?;
        if normalized.address.is_empty() {
            return Err(LookupError::invalid("address", "is required"));
        }
        let address = &normalized.address;
        let zip = request.zip.as_str();

        log::debug!(
            "Looking up {} {zip} ({} variants)",
            address.canonical(),
            normalized.variants.len()
        );

        let building = self.resolver.resolve(address, zip).await;

        let selected = self
            .gateways
            .iter()
            .filter(|g| request.category.is_none_or(|c| c == g.category()));
        let outputs = join_all(selected.map(|gateway| {
            self.query_gateway(gateway.as_ref(), &normalized, zip, &building)
        }))
        .await;

        let found: usize = outputs.iter().map(|o| o.records.len()).sum();
        if found > 0 {
            return Ok(correlate(
                address,
                zip,
                outputs,
                building,
                request.count,
                request.category,
            ));
        }

        log::info!(
            "No records from {} gateways for {} {zip}, trying fallback '{}'",
            outputs.len(),
            address.canonical(),
            self.fallback.name()
        );

        let outcome = match tokio::time::timeout(
            self.fallback_timeout,
            self.fallback.fetch_building_records(address, zip),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                log::warn!(
                    "Fallback '{}' timed out after {:?}",
                    self.fallback.name(),
                    self.fallback_timeout
                );
                FallbackOutcome::Unavailable
            }
        };

        Ok(match outcome {
            FallbackOutcome::Available(result) => {
                (*result).restrict(request.category, request.count.as_limit())
            }
            FallbackOutcome::Unavailable => CorrelatedResult::empty(metadata(address, zip, building)),
        })
    }

    /// Runs [`Self::lookup`] on its own task, so a panic inside a gateway,
    /// resolver tier or fallback fails only this request.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::lookup`], or
    /// [`LookupError::Unexpected`] if the task panics or is cancelled.
    pub async fn lookup_task(
        self: Arc<Self>,
        request: LookupRequest,
    ) -> Result<CorrelatedResult, LookupError> {
        tokio::spawn(async move { self.lookup(&request).await })
            .await
            .map_err(|e| LookupError::Unexpected(format!("lookup task failed: {e}")))?
    }

    async fn query_gateway(
        &self,
        gateway: &dyn DatasetGateway,
        normalized: &NormalizedAddress,
        zip: &str,
        building: &BuildingIdentifier,
    ) -> GatewayOutput {
        let mut output = GatewayOutput::empty(
            gateway.id().to_string(),
            gateway.category(),
            gateway.house_range().cloned(),
        );

        let filter = match gateway.build_filter(&normalized.variants, zip, building) {
            Ok(filter) => filter,
            Err(QueryError::MissingIdentifier(kind)) => {
                log::debug!("{}: skipped, no {kind} for this address", gateway.id());
                return output;
            }
            Err(e) => {
                log::warn!("{}: cannot build filter: {e}", gateway.id());
                return output;
            }
        };

        let query = GatewayQuery::new(filter).with_house_number(&normalized.address.house_number);

        match tokio::time::timeout(self.gateway_timeout, gateway.query(&query)).await {
            Ok(Ok(records)) => output.records = records,
            Ok(Err(e)) => log::warn!("{}: query failed: {e}", gateway.id()),
            Err(_) => log::warn!(
                "{}: timed out after {:?}",
                gateway.id(),
                self.gateway_timeout
            ),
        }

        output
    }
}
