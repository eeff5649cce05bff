//! Alternate data source consulted when every dataset gateway comes back
//! empty.
//!
//! Implementations (browser automation, bulk exports, ...) live outside
//! this workspace. They must produce the same [`CorrelatedResult`] shape as
//! the gateway pipeline so callers cannot tell the sources apart.

use async_trait::async_trait;
use nyc_housing_address::Address;
use nyc_housing_record_models::CorrelatedResult;

/// Result of a fallback fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackOutcome {
    /// The source produced a result.
    Available(Box<CorrelatedResult>),
    /// The source had nothing or could not be reached. Treated as "no data
    /// found", never as an error.
    Unavailable,
}

/// Port to an out-of-process building-records source.
#[async_trait]
pub trait ScrapeFallbackPort: Send + Sync {
    /// Short name for log lines.
    fn name(&self) -> &str;

    /// Fetches records for one building.
    async fn fetch_building_records(&self, address: &Address, zip: &str) -> FallbackOutcome;
}

/// Fallback that never has data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

#[async_trait]
impl ScrapeFallbackPort for NoFallback {
    fn name(&self) -> &str {
        "none"
    }

    async fn fetch_building_records(&self, _address: &Address, _zip: &str) -> FallbackOutcome {
        FallbackOutcome::Unavailable
    }
}
