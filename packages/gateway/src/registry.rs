//! Dataset registry: loads all dataset definitions from embedded TOML
//! configs and builds gateways for the enabled ones.
//!
//! Each `.toml` file in `packages/gateway/datasets/` is baked into the
//! binary at compile time via [`include_str!`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::DatasetGateway;
use crate::definition::{DataSource, DatasetDefinition, parse_dataset_toml};
use crate::rent_stabilized::{RentStabilizedGateway, RentStabilizedRegistry};
use crate::socrata::SocrataGateway;

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    ("complaints_311", include_str!("../datasets/complaints_311.toml")),
    ("lead_violations", include_str!("../datasets/lead_violations.toml")),
    ("bedbug_reports", include_str!("../datasets/bedbug_reports.toml")),
    ("hpd_violations", include_str!("../datasets/hpd_violations.toml")),
    ("nycha_addresses", include_str!("../datasets/nycha_addresses.toml")),
    ("rent_stabilized", include_str!("../datasets/rent_stabilized.toml")),
    (
        "housing_litigation",
        include_str!("../datasets/housing_litigation.toml"),
    ),
];

/// Runtime inputs for building gateways.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// Shared HTTP client.
    pub client: reqwest::Client,
    /// Socrata app token sent as `X-App-Token`.
    pub app_token: Option<String>,
    /// Path to the combined rent-stabilization CSV.
    pub rent_stabilized_csv: Option<PathBuf>,
}

/// Returns all dataset definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Returns only enabled definitions.
#[must_use]
pub fn enabled_datasets() -> Vec<DatasetDefinition> {
    all_datasets().into_iter().filter(|d| d.enabled).collect()
}

/// Looks up one definition by id.
#[must_use]
pub fn dataset(id: &str) -> Option<DatasetDefinition> {
    all_datasets().into_iter().find(|d| d.id == id)
}

/// Builds a gateway for every enabled dataset that can run with `config`.
///
/// Datasets whose inputs are missing (no registry CSV, unreadable file)
/// are skipped with a log line rather than failing startup.
#[must_use]
pub fn build_gateways(config: &GatewayConfig) -> Vec<Arc<dyn DatasetGateway>> {
    let mut registry: Option<Arc<RentStabilizedRegistry>> = None;
    let mut gateways: Vec<Arc<dyn DatasetGateway>> = Vec::new();

    for definition in enabled_datasets() {
        match &definition.source {
            DataSource::Socrata { .. } => {
                if let Some(gateway) =
                    SocrataGateway::new(definition, config.client.clone(), config.app_token.clone())
                {
                    gateways.push(Arc::new(gateway));
                }
            }
            DataSource::LocalCsv => {
                let Some(path) = &config.rent_stabilized_csv else {
                    log::info!(
                        "{}: RENT_STABILIZED_CSV not set, dataset disabled",
                        definition.id
                    );
                    continue;
                };
                if registry.is_none() {
                    match RentStabilizedRegistry::load(path) {
                        Ok(loaded) => registry = Some(Arc::new(loaded)),
                        Err(e) => {
                            log::warn!(
                                "{}: failed to load {}: {e}",
                                definition.id,
                                path.display()
                            );
                            continue;
                        }
                    }
                }
                if let Some(registry) = &registry {
                    gateways.push(Arc::new(RentStabilizedGateway::new(
                        definition,
                        Arc::clone(registry),
                    )));
                }
            }
        }
    }

    log::info!(
        "Built {} dataset gateways: {}",
        gateways.len(),
        gateways
            .iter()
            .map(|g| g.id())
            .collect::<Vec<_>>()
            .join(", ")
    );

    gateways
}
