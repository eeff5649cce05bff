//! Environment-driven configuration.
//!
//! Everything is read once at startup into a [`LookupConfig`] and passed
//! to constructors explicitly.

use std::path::PathBuf;
use std::time::Duration;

use nyc_housing_resolver::geoclient::GeoclientCredentials;

use crate::LookupError;

/// Default per-gateway timeout.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(20);

/// Default timeout for the scrape fallback.
pub const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_secs(45);

/// User agent sent to every external service.
pub const USER_AGENT: &str = concat!("nyc-housing-lookup/", env!("CARGO_PKG_VERSION"));

/// Runtime configuration for [`crate::BuildingLookup`].
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// `NYC_GEOCLIENT_APP_ID` + `NYC_GEOCLIENT_APP_KEY`.
    pub geoclient: Option<GeoclientCredentials>,
    /// `SOCRATA_APP_TOKEN`.
    pub socrata_app_token: Option<String>,
    /// `NYC_HOUSING_OVERRIDES`: override-table TOML.
    pub overrides_path: Option<PathBuf>,
    /// `RENT_STABILIZED_CSV`: combined registry CSV.
    pub rent_stabilized_csv: Option<PathBuf>,
    /// `GATEWAY_TIMEOUT_SECS`.
    pub gateway_timeout: Duration,
    /// `FALLBACK_TIMEOUT_SECS`.
    pub fallback_timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            geoclient: None,
            socrata_app_token: None,
            overrides_path: None,
            rent_stabilized_csv: None,
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
            fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
        }
    }
}

impl LookupConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] if `GATEWAY_TIMEOUT_SECS` or
    /// `FALLBACK_TIMEOUT_SECS` is not a positive integer.
    pub fn from_env() -> Result<Self, LookupError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Config`] if `GATEWAY_TIMEOUT_SECS` or
    /// `FALLBACK_TIMEOUT_SECS` is not a positive integer.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LookupError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let geoclient = match (var("NYC_GEOCLIENT_APP_ID"), var("NYC_GEOCLIENT_APP_KEY")) {
            (Some(app_id), Some(app_key)) => Some(GeoclientCredentials { app_id, app_key }),
            (None, None) => None,
            _ => {
                log::warn!(
                    "Only one of NYC_GEOCLIENT_APP_ID/NYC_GEOCLIENT_APP_KEY is set, GeoClient disabled"
                );
                None
            }
        };

        let timeout = |key: &str, default: Duration| match var(key) {
            None => Ok(default),
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                _ => Err(LookupError::Config(format!(
                    "{key} must be a positive integer, got '{raw}'"
                ))),
            },
        };

        Ok(Self {
            geoclient,
            socrata_app_token: var("SOCRATA_APP_TOKEN"),
            overrides_path: var("NYC_HOUSING_OVERRIDES").map(PathBuf::from),
            rent_stabilized_csv: var("RENT_STABILIZED_CSV").map(PathBuf::from),
            gateway_timeout: timeout("GATEWAY_TIMEOUT_SECS", DEFAULT_GATEWAY_TIMEOUT)?,
            fallback_timeout: timeout("FALLBACK_TIMEOUT_SECS", DEFAULT_FALLBACK_TIMEOUT)?,
        })
    }
}
