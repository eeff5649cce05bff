//! NYC `GeoSearch` tier.
//!
//! `GeoSearch` is a Pelias instance loaded with the city's PAD address
//! file. `GET {base_url}/search?text=...&size=1` returns a `GeoJSON`
//! `FeatureCollection` whose first feature carries
//! `properties.addendum.pad.bin` and `properties.addendum.pad.bbl`.

use async_trait::async_trait;
use nyc_housing_gateway::http;
use nyc_housing_record_models::SourceTier;

use crate::{IdentifierTier, TierError, TierHit, TierRequest};

/// Secondary building-info tier.
pub struct GeosearchTier {
    name: String,
    client: reqwest::Client,
    base_url: String,
}

impl GeosearchTier {
    /// Creates the tier.
    #[must_use]
    pub const fn new(name: String, client: reqwest::Client, base_url: String) -> Self {
        Self {
            name,
            client,
            base_url,
        }
    }
}

/// Free-text query: `"393 HEWES ST, Brooklyn, NY 11211"`.
fn search_text(request: &TierRequest) -> String {
    let mut text = request.address.canonical_key();
    if let Some(borough) = request.borough {
        text.push_str(", ");
        text.push_str(&borough.to_string());
    }
    text.push_str(", NY ");
    text.push_str(&request.zip);
    text
}

#[async_trait]
impl IdentifierTier for GeosearchTier {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_tier(&self) -> SourceTier {
        SourceTier::Fallback1
    }

    async fn lookup(&self, request: &TierRequest) -> Result<Option<TierHit>, TierError> {
        let url = format!("{}/search", self.base_url);
        let text = search_text(request);
        let body = http::send_json(
            self.client
                .get(&url)
                .query(&[("text", text.as_str()), ("size", "1")]),
        )
        .await?;

        parse_response(&body, &request.zip)
    }
}

/// Parses a `GeoSearch` `FeatureCollection`. A first feature in a
/// different ZIP code is treated as a miss.
fn parse_response(body: &serde_json::Value, zip: &str) -> Result<Option<TierHit>, TierError> {
    let features = body
        .get("features")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| TierError::Parse {
            message: "GeoSearch response missing 'features' array".to_string(),
        })?;

    let Some(first) = features.first() else {
        return Ok(None);
    };

    let postal = first
        .pointer("/properties/postalcode")
        .and_then(serde_json::Value::as_str);
    if postal.is_some_and(|p| p != zip) {
        return Ok(None);
    }

    let pad = |name: &str| {
        first
            .pointer(&format!("/properties/addendum/pad/{name}"))
            .and_then(serde_json::Value::as_str)
    };

    Ok(TierHit::from_raw(pad("bin"), pad("bbl")))
}

#[cfg(test)]
mod tests {
    use nyc_housing_address::normalize;

    use super::*;

    fn feature(postal: &str) -> serde_json::Value {
        serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-73.9571, 40.7081]},
                "properties": {
                    "label": "393 HEWES STREET, Brooklyn, NY, USA",
                    "postalcode": postal,
                    "addendum": {"pad": {"bin": "3061234", "bbl": "3022330014"}}
                }
            }]
        })
    }

    #[test]
    fn parses_pad_identifiers() {
        let hit = parse_response(&feature("11211"), "11211").unwrap().unwrap();
        assert_eq!(hit.bin.as_deref(), Some("3061234"));
        assert_eq!(hit.bbl.as_deref(), Some("3022330014"));
    }

    #[test]
    fn other_zip_is_a_miss() {
        assert!(parse_response(&feature("11206"), "11211").unwrap().is_none());
    }

    #[test]
    fn empty_collection_is_a_miss() {
        let body = serde_json::json!({"type": "FeatureCollection", "features": []});
        assert!(parse_response(&body, "11211").unwrap().is_none());
    }

    #[test]
    fn builds_search_text() {
        let address = normalize("393 Hewes St").unwrap().address;
        let request = TierRequest::new(&address, "11211");
        assert_eq!(search_text(&request), "393 HEWES ST, Brooklyn, NY 11211");
    }
}
