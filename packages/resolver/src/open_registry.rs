//! Open-registry tier: reads the BIN/BBL columns of any dataset row filed
//! at the address.

use std::sync::Arc;

use async_trait::async_trait;
use nyc_housing_gateway::{DatasetGateway, GatewayQuery};
use nyc_housing_record_models::{BuildingIdentifier, DatasetRecord, SourceTier};

use crate::{IdentifierTier, TierError, TierHit, TierRequest};

/// Last-resort tier backed by an address-keyed dataset gateway.
pub struct OpenRegistryTier {
    name: String,
    gateway: Arc<dyn DatasetGateway>,
}

impl OpenRegistryTier {
    /// Creates the tier.
    #[must_use]
    pub fn new(name: String, gateway: Arc<dyn DatasetGateway>) -> Self {
        Self { name, gateway }
    }
}

fn identifiers(record: &DatasetRecord) -> Option<TierHit> {
    TierHit::from_raw(record.raw_value("bin"), record.raw_value("bbl"))
}

#[async_trait]
impl IdentifierTier for OpenRegistryTier {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_tier(&self) -> SourceTier {
        SourceTier::Fallback2
    }

    async fn lookup(&self, request: &TierRequest) -> Result<Option<TierHit>, TierError> {
        let filter = self.gateway.build_filter(
            &request.variants,
            &request.zip,
            &BuildingIdentifier::unresolved(request.borough),
        )?;
        let mut query = GatewayQuery::new(filter);
        query.limit = 5;

        let records = self.gateway.query(&query).await?;
        Ok(records.iter().find_map(identifiers))
    }
}
