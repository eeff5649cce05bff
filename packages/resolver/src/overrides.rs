//! Operator-maintained address overrides.
//!
//! A small TOML table of known address → identifier pairs for buildings
//! the geocoders get wrong. Empty by default.
//!
//! ```toml
//! [[override]]
//! address = "393 Hewes St"
//! zip = "11211"
//! bin = "3061234"
//! bbl = "3022330014"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use nyc_housing_address::normalize;
use nyc_housing_record_models::SourceTier;
use serde::Deserialize;

use crate::{IdentifierTier, TierError, TierHit, TierRequest};

#[derive(Debug, Deserialize)]
struct OverrideFile {
    #[serde(default, rename = "override")]
    entries: Vec<OverrideEntry>,
}

#[derive(Debug, Deserialize)]
struct OverrideEntry {
    address: String,
    zip: String,
    bin: Option<String>,
    bbl: Option<String>,
}

/// Override table keyed by canonical address and ZIP.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: BTreeMap<(String, String), TierHit>,
}

impl OverrideTable {
    /// Parses an override table. Entries whose address does not normalize
    /// or that carry no usable identifier are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::Config`] if the TOML is malformed.
    pub fn parse(toml_str: &str) -> Result<Self, TierError> {
        let file: OverrideFile = toml::de::from_str(toml_str).map_err(|e| TierError::Config {
            message: e.to_string(),
        })?;

        let mut entries = BTreeMap::new();
        for entry in file.entries {
            let key = match normalize(&entry.address) {
                Ok(parsed) if !parsed.address.is_empty() => parsed.address.canonical_key(),
                Ok(_) | Err(_) => {
                    log::warn!("Skipping override with unparsable address '{}'", entry.address);
                    continue;
                }
            };
            let Some(hit) = TierHit::from_raw(entry.bin.as_deref(), entry.bbl.as_deref()) else {
                log::warn!("Skipping override for '{}' with no identifier", entry.address);
                continue;
            };
            entries.insert((key, entry.zip.trim().to_string()), hit);
        }

        Ok(Self { entries })
    }

    /// Loads an override table from disk.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, TierError> {
        let contents = std::fs::read_to_string(path).map_err(|e| TierError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        let table = Self::parse(&contents)?;
        log::info!("Loaded {} address overrides from {}", table.len(), path.display());
        Ok(table)
    }

    /// Looks up an address by canonical form and ZIP.
    #[must_use]
    pub fn get(&self, canonical_key: &str, zip: &str) -> Option<&TierHit> {
        self.entries
            .get(&(canonical_key.to_string(), zip.to_string()))
    }

    /// Number of usable entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tier backed by an [`OverrideTable`].
pub struct OverrideTier {
    name: String,
    table: OverrideTable,
}

impl OverrideTier {
    /// Creates the tier.
    #[must_use]
    pub const fn new(name: String, table: OverrideTable) -> Self {
        Self { name, table }
    }
}

#[async_trait]
impl IdentifierTier for OverrideTier {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_tier(&self) -> SourceTier {
        SourceTier::Hardcoded
    }

    async fn lookup(&self, request: &TierRequest) -> Result<Option<TierHit>, TierError> {
        Ok(self
            .table
            .get(&request.address.canonical_key(), &request.zip)
            .cloned())
    }
}
