//! Compile-time registry of identifier service configurations.
//!
//! Each resolver tier is defined in a TOML file under `services/`. The
//! registry embeds these at compile time and exposes them via
//! [`all_services`] and [`enabled_services`].

use serde::Deserialize;

/// An identifier service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifierService {
    /// Unique identifier (e.g., `"geoclient"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service is active in the resolver.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Execution order. Lower values run first.
    pub priority: u32,
    /// Per-attempt timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Operator-maintained address overrides.
    OverrideTable,
    /// NYC `GeoClient` address endpoint.
    Geoclient {
        /// API base URL (e.g., `"https://api.nyc.gov/geo/geoclient/v2"`).
        base_url: String,
    },
    /// NYC `GeoSearch` (Pelias-based) search endpoint.
    Geosearch {
        /// API base URL (e.g., `"https://geosearch.planninglabs.nyc/v2"`).
        base_url: String,
    },
    /// A public dataset whose rows carry BIN/BBL columns.
    OpenRegistry {
        /// Dataset id from the gateway registry.
        dataset: String,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_timeout() -> u64 {
    10
}

impl IdentifierService {
    /// Returns the provider's base URL regardless of variant.
    ///
    /// Returns an empty string for providers without a base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Geoclient { base_url } | ProviderConfig::Geosearch { base_url } => {
                base_url
            }
            ProviderConfig::OverrideTable | ProviderConfig::OpenRegistry { .. } => "",
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("overrides", include_str!("../services/overrides.toml")),
    ("geoclient", include_str!("../services/geoclient.toml")),
    ("geosearch", include_str!("../services/geosearch.toml")),
    ("open_registry", include_str!("../services/open_registry.toml")),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 4;

/// Returns all identifier service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<IdentifierService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse identifier service '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled services, sorted by priority (ascending).
#[must_use]
pub fn enabled_services() -> Vec<IdentifierService> {
    let mut services: Vec<IdentifierService> =
        all_services().into_iter().filter(|s| s.enabled).collect();
    services.sort_by_key(|s| s.priority);
    services
}
