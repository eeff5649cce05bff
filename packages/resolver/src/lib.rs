#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Building identifier (BIN/BBL) resolution.
//!
//! A [`BuildingIdentifierResolver`] walks an ordered list of
//! [`IdentifierTier`]s, one at a time, each under its own timeout. The
//! first tier that returns an identifier wins. Failures and timeouts fall
//! through to the next tier; when every tier misses, the result is
//! [`BuildingIdentifier::unresolved`], which is a valid outcome rather
//! than an error.

pub mod geoclient;
pub mod geosearch;
pub mod open_registry;
pub mod overrides;
pub mod service_registry;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nyc_housing_address::{Address, AddressVariantSet, borough::borough_from_zip};
use nyc_housing_gateway::{DatasetGateway, GatewayError};
use nyc_housing_query::QueryError;
use nyc_housing_record_models::{Borough, BuildingIdentifier, SourceTier};

use crate::geoclient::{GeoclientCredentials, GeoclientTier};
use crate::geosearch::GeosearchTier;
use crate::open_registry::OpenRegistryTier;
use crate::overrides::{OverrideTable, OverrideTier};
use crate::service_registry::{ProviderConfig, enabled_services};

/// Errors from a single resolver tier. Never fatal to a lookup.
#[derive(Debug, thiserror::Error)]
pub enum TierError {
    /// Transport, status or decoding failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry filter could not be built.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// The response did not have the expected shape.
    #[error("Parse error: {message}")]
    Parse {
        /// What was wrong.
        message: String,
    },

    /// An override table could not be read.
    #[error("Override table error: {message}")]
    Config {
        /// What was wrong.
        message: String,
    },
}

/// Everything a tier may need to look up one address.
#[derive(Debug, Clone)]
pub struct TierRequest {
    /// Parsed address.
    pub address: Address,
    /// Variant spellings of the address.
    pub variants: AddressVariantSet,
    /// Caller-supplied ZIP code.
    pub zip: String,
    /// Borough derived from the ZIP code.
    pub borough: Option<Borough>,
}

impl TierRequest {
    /// Builds a request, deriving variants and borough.
    #[must_use]
    pub fn new(address: &Address, zip: &str) -> Self {
        Self {
            address: address.clone(),
            variants: AddressVariantSet::for_address(address),
            zip: zip.to_string(),
            borough: borough_from_zip(zip),
        }
    }
}

/// Identifiers returned by a tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierHit {
    /// Building Identification Number.
    pub bin: Option<String>,
    /// Borough-Block-Lot.
    pub bbl: Option<String>,
}

impl TierHit {
    /// Builds a hit from raw values, discarding blanks and placeholder
    /// BINs. Returns `None` if nothing usable remains.
    #[must_use]
    pub fn from_raw(bin: Option<&str>, bbl: Option<&str>) -> Option<Self> {
        let bin = bin.map(str::trim).filter(|b| is_real_bin(b)).map(String::from);
        let bbl = bbl
            .map(str::trim)
            .filter(|b| !b.is_empty() && b.chars().any(|c| c != '0'))
            .map(String::from);
        if bin.is_none() && bbl.is_none() {
            return None;
        }
        Some(Self { bin, bbl })
    }
}

/// `1000000`, `2000000`, ... are borough-level placeholder BINs assigned
/// when a building has no BIN of its own.
fn is_real_bin(bin: &str) -> bool {
    bin.len() == 7 && bin.chars().all(|c| c.is_ascii_digit()) && !bin.ends_with("000000")
}

/// One step of identifier resolution.
#[async_trait]
pub trait IdentifierTier: Send + Sync {
    /// Service id for log lines.
    fn name(&self) -> &str;

    /// Tier recorded on identifiers this step produces.
    fn source_tier(&self) -> SourceTier;

    /// Looks up the building. `Ok(None)` means "not found here".
    ///
    /// # Errors
    ///
    /// Returns [`TierError`] on transport or decoding failures.
    async fn lookup(&self, request: &TierRequest) -> Result<Option<TierHit>, TierError>;
}

struct TierSlot {
    tier: Arc<dyn IdentifierTier>,
    timeout: Duration,
}

/// Sequential, first-success-wins identifier resolver.
#[derive(Default)]
pub struct BuildingIdentifierResolver {
    tiers: Vec<TierSlot>,
}

impl BuildingIdentifierResolver {
    /// A resolver with no tiers (always unresolved).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tier with its own timeout.
    #[must_use]
    pub fn with_tier(mut self, tier: Arc<dyn IdentifierTier>, timeout: Duration) -> Self {
        self.tiers.push(TierSlot { tier, timeout });
        self
    }

    /// Names of the configured tiers in execution order.
    #[must_use]
    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|s| s.tier.name()).collect()
    }

    /// Resolves an address to a building identifier.
    ///
    /// Tiers run strictly one after another; a tier is only attempted after
    /// every earlier tier missed, failed, or timed out.
    pub async fn resolve(&self, address: &Address, zip: &str) -> BuildingIdentifier {
        let request = TierRequest::new(address, zip);

        for slot in &self.tiers {
            let name = slot.tier.name();
            match tokio::time::timeout(slot.timeout, slot.tier.lookup(&request)).await {
                Ok(Ok(Some(hit))) => {
                    let source_tier = slot.tier.source_tier();
                    log::debug!(
                        "{name}: resolved {} to bin={:?} bbl={:?}",
                        address.canonical(),
                        hit.bin,
                        hit.bbl
                    );
                    return BuildingIdentifier {
                        bin: hit.bin,
                        bbl: hit.bbl,
                        borough: request.borough,
                        source_tier,
                    };
                }
                Ok(Ok(None)) => log::debug!("{name}: no match"),
                Ok(Err(e)) => log::warn!("{name}: lookup failed: {e}"),
                Err(_) => log::warn!("{name}: timed out after {:?}", slot.timeout),
            }
        }

        log::info!(
            "Building identifier unresolved for {} {zip}",
            address.canonical()
        );
        BuildingIdentifier::unresolved(request.borough)
    }
}

/// Runtime inputs for building the resolver from the service registry.
#[derive(Clone, Default)]
pub struct ResolverConfig {
    /// Shared HTTP client.
    pub client: reqwest::Client,
    /// `GeoClient` credentials; `None` disables that tier.
    pub geoclient: Option<GeoclientCredentials>,
    /// Address overrides; `None` disables the override tier.
    pub overrides: Option<OverrideTable>,
    /// Dataset gateways available to the open-registry tier.
    pub gateways: Vec<Arc<dyn DatasetGateway>>,
}

/// Builds a resolver from the enabled services, in priority order.
/// Services whose inputs are missing are skipped with a log line.
#[must_use]
pub fn build_resolver(config: &ResolverConfig) -> BuildingIdentifierResolver {
    let mut resolver = BuildingIdentifierResolver::new();

    for service in enabled_services() {
        let timeout = Duration::from_secs(service.timeout_secs);
        let tier: Arc<dyn IdentifierTier> = match &service.provider {
            ProviderConfig::OverrideTable => {
                let Some(table) = config.overrides.clone() else {
                    log::debug!("{}: no override table configured", service.id);
                    continue;
                };
                Arc::new(OverrideTier::new(service.id.clone(), table))
            }
            ProviderConfig::Geoclient { base_url } => {
                let Some(credentials) = config.geoclient.clone() else {
                    log::info!(
                        "{}: NYC_GEOCLIENT_APP_ID/NYC_GEOCLIENT_APP_KEY not set, tier disabled",
                        service.id
                    );
                    continue;
                };
                Arc::new(GeoclientTier::new(
                    service.id.clone(),
                    config.client.clone(),
                    base_url.clone(),
                    credentials,
                ))
            }
            ProviderConfig::Geosearch { base_url } => Arc::new(GeosearchTier::new(
                service.id.clone(),
                config.client.clone(),
                base_url.clone(),
            )),
            ProviderConfig::OpenRegistry { dataset } => {
                let Some(gateway) = config.gateways.iter().find(|g| g.id() == dataset.as_str()) else {
                    log::info!("{}: dataset '{dataset}' unavailable, tier disabled", service.id);
                    continue;
                };
                Arc::new(OpenRegistryTier::new(service.id.clone(), Arc::clone(gateway)))
            }
        };
        resolver = resolver.with_tier(tier, timeout);
    }

    log::info!(
        "Identifier tiers: {}",
        resolver.tier_names().join(" -> ")
    );

    resolver
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use nyc_housing_address::normalize;

    use super::*;

    enum Behavior {
        Hit(&'static str),
        Miss,
        Fail,
        Hang,
    }

    struct MockTier {
        name: &'static str,
        tier: SourceTier,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl MockTier {
        fn new(name: &'static str, tier: SourceTier, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                tier,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl IdentifierTier for MockTier {
        fn name(&self) -> &str {
            self.name
        }

        fn source_tier(&self) -> SourceTier {
            self.tier
        }

        async fn lookup(&self, _request: &TierRequest) -> Result<Option<TierHit>, TierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Hit(bin) => Ok(TierHit::from_raw(Some(bin), None)),
                Behavior::Miss => Ok(None),
                Behavior::Fail => Err(TierError::Parse {
                    message: "boom".to_string(),
                }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(None)
                }
            }
        }
    }

    fn hewes() -> Address {
        normalize("393 Hewes St").unwrap().address
    }

    const FAST: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn first_success_wins_and_later_tiers_are_skipped() {
        let failing = MockTier::new("geoclient", SourceTier::Primary, Behavior::Fail);
        let hit = MockTier::new("geosearch", SourceTier::Fallback1, Behavior::Hit("3061234"));
        let never = MockTier::new("registry", SourceTier::Fallback2, Behavior::Hit("3999999"));

        let resolver = BuildingIdentifierResolver::new()
            .with_tier(failing.clone(), FAST)
            .with_tier(hit.clone(), FAST)
            .with_tier(never.clone(), FAST);

        let id = resolver.resolve(&hewes(), "11211").await;
        assert_eq!(id.bin.as_deref(), Some("3061234"));
        assert_eq!(id.source_tier, SourceTier::Fallback1);
        assert_eq!(id.borough, Some(Borough::Brooklyn));
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert_eq!(never.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn timeouts_fall_through() {
        let hang = MockTier::new("geoclient", SourceTier::Primary, Behavior::Hang);
        let hit = MockTier::new("registry", SourceTier::Fallback2, Behavior::Hit("3061234"));
        let resolver = BuildingIdentifierResolver::new()
            .with_tier(hang, FAST)
            .with_tier(hit, FAST);

        let id = resolver.resolve(&hewes(), "11211").await;
        assert_eq!(id.source_tier, SourceTier::Fallback2);
    }

    #[tokio::test]
    async fn exhausting_tiers_is_unresolved_not_an_error() {
        let resolver = BuildingIdentifierResolver::new()
            .with_tier(MockTier::new("a", SourceTier::Hardcoded, Behavior::Miss), FAST)
            .with_tier(MockTier::new("b", SourceTier::Primary, Behavior::Fail), FAST);

        let id = resolver.resolve(&hewes(), "11211").await;
        assert!(!id.is_resolved());
        assert_eq!(id.source_tier, SourceTier::Unresolved);
        assert_eq!(id.borough, Some(Borough::Brooklyn));
    }

    #[test]
    fn placeholder_bins_are_discarded() {
        assert_eq!(TierHit::from_raw(Some("3000000"), None), None);
        assert_eq!(TierHit::from_raw(Some(""), Some("0000000000")), None);
        assert_eq!(
            TierHit::from_raw(Some("3000000"), Some("3022330014")),
            Some(TierHit {
                bin: None,
                bbl: Some("3022330014".to_string()),
            })
        );
        assert!(TierHit::from_raw(Some("3061234"), None).is_some());
    }

    #[test]
    fn builds_keyless_resolver_from_registry() {
        let resolver = build_resolver(&ResolverConfig::default());
        assert_eq!(resolver.tier_names(), vec!["geosearch"]);
    }
}
