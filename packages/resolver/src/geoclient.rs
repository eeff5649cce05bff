//! NYC `GeoClient` v2 address tier.
//!
//! `GET {base_url}/address` with `houseNumber`, `street`, `borough` and
//! `zip`, authenticated by `app_id` and the `Ocp-Apim-Subscription-Key`
//! header. The response's `address` object carries
//! `buildingIdentificationNumber` and `bbl`.

use async_trait::async_trait;
use nyc_housing_gateway::http;
use nyc_housing_record_models::SourceTier;

use crate::{IdentifierTier, TierError, TierHit, TierRequest};

/// `GeoClient` API credentials.
#[derive(Debug, Clone)]
pub struct GeoclientCredentials {
    /// Application id (`app_id` query parameter).
    pub app_id: String,
    /// Subscription key (`Ocp-Apim-Subscription-Key` header).
    pub app_key: String,
}

/// Primary geocoding tier.
pub struct GeoclientTier {
    name: String,
    client: reqwest::Client,
    base_url: String,
    credentials: GeoclientCredentials,
}

impl GeoclientTier {
    /// Creates the tier.
    #[must_use]
    pub const fn new(
        name: String,
        client: reqwest::Client,
        base_url: String,
        credentials: GeoclientCredentials,
    ) -> Self {
        Self {
            name,
            client,
            base_url,
            credentials,
        }
    }
}

#[async_trait]
impl IdentifierTier for GeoclientTier {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_tier(&self) -> SourceTier {
        SourceTier::Primary
    }

    async fn lookup(&self, request: &TierRequest) -> Result<Option<TierHit>, TierError> {
        let Some(borough) = request.borough else {
            log::debug!("{}: no borough for ZIP {}", self.name, request.zip);
            return Ok(None);
        };

        let url = format!("{}/address", self.base_url);
        let street = request.address.street_line();
        let borough = borough.to_string();
        let params = [
            ("houseNumber", request.address.house_number.as_str()),
            ("street", street.as_str()),
            ("borough", borough.as_str()),
            ("zip", request.zip.as_str()),
            ("app_id", self.credentials.app_id.as_str()),
        ];

        let body = http::send_json(
            self.client
                .get(&url)
                .query(&params)
                .header("Ocp-Apim-Subscription-Key", &self.credentials.app_key),
        )
        .await?;

        parse_response(&body)
    }
}

/// Parses a `GeoClient` address response.
fn parse_response(body: &serde_json::Value) -> Result<Option<TierHit>, TierError> {
    let address = body
        .get("address")
        .and_then(serde_json::Value::as_object)
        .ok_or_else(|| TierError::Parse {
            message: "GeoClient response missing 'address' object".to_string(),
        })?;

    let field = |name: &str| address.get(name).and_then(serde_json::Value::as_str);

    Ok(TierHit::from_raw(
        field("buildingIdentificationNumber"),
        field("bbl"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_geoclient_address() {
        let body = serde_json::json!({
            "address": {
                "buildingIdentificationNumber": "3061234",
                "bbl": "3022330014",
                "geosupportReturnCode": "00",
                "firstBoroughName": "BROOKLYN"
            }
        });
        let hit = parse_response(&body).unwrap().unwrap();
        assert_eq!(hit.bin.as_deref(), Some("3061234"));
        assert_eq!(hit.bbl.as_deref(), Some("3022330014"));
    }

    #[test]
    fn unmatched_address_is_a_miss() {
        let body = serde_json::json!({
            "address": {
                "geosupportReturnCode": "11",
                "message": "HEWES STREET NOT RECOGNIZED"
            }
        });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn missing_address_object_is_an_error() {
        let body = serde_json::json!({"message": "Access denied"});
        assert!(matches!(parse_response(&body), Err(TierError::Parse { .. })));
    }
}
