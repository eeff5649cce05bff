//! HTTP handler functions for the lookup API.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use nyc_housing_gateway::all_datasets;
use nyc_housing_gateway::definition::DatasetDefinition;
use nyc_housing_gateway::registry::dataset as find_dataset;
use nyc_housing_lookup::{LookupError, LookupRequest};
use nyc_housing_server_models::{
    ApiDataset, ApiError, ApiHealth, ApiLookupResponse, BuildingLookupParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/datasets`
///
/// Lists the dataset registry and which datasets this server queries.
pub async fn datasets(state: web::Data<AppState>) -> HttpResponse {
    let datasets: Vec<ApiDataset> = all_datasets()
        .into_iter()
        .map(|d| api_dataset(&state, d))
        .collect();

    HttpResponse::Ok().json(datasets)
}

/// `GET /api/datasets/{id}`
pub async fn dataset(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    match find_dataset(&id) {
        Some(definition) => HttpResponse::Ok().json(api_dataset(&state, definition)),
        None => HttpResponse::NotFound().json(ApiError::new(format!("Unknown dataset '{id}'"))),
    }
}

fn api_dataset(state: &AppState, definition: DatasetDefinition) -> ApiDataset {
    let active = state
        .lookup
        .gateways()
        .iter()
        .any(|g| g.id() == definition.id);
    ApiDataset {
        active,
        range_keyed: definition.range.is_some(),
        id: definition.id,
        name: definition.name,
        category: definition.category,
        limit: definition.limit,
    }
}

/// `GET /api/building-lookup`
///
/// Resolves an address and returns its records grouped by category. No
/// data is a successful empty response.
pub async fn building_lookup(
    state: web::Data<AppState>,
    params: web::Query<BuildingLookupParams>,
) -> HttpResponse {
    let request = match LookupRequest::from_params(
        params.address.as_deref(),
        params.zip_code.as_deref(),
        params.count.as_deref(),
        params.category.as_deref(),
    ) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    match Arc::clone(&state.lookup).lookup_task(request).await {
        Ok(result) => {
            log::info!(
                "Lookup {} {}: {} records, identifier from {}",
                result.metadata.address,
                result.metadata.zip,
                result.total_records(),
                result.metadata.building_identifier.source_tier
            );
            HttpResponse::Ok().json(ApiLookupResponse::from(result))
        }
        Err(e) => error_response(&e),
    }
}

fn error_response(error: &LookupError) -> HttpResponse {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        log::error!("Building lookup failed: {error}");
    } else {
        log::debug!("Rejected building lookup: {error}");
    }
    HttpResponse::build(status).json(ApiError::new(error.user_message()))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};
    use async_trait::async_trait;
    use nyc_housing_address::Address;
    use nyc_housing_lookup::{BuildingLookup, FallbackOutcome, ScrapeFallbackPort};
    use nyc_housing_resolver::BuildingIdentifierResolver;

    use super::*;

    struct BrokenFallback;

    #[async_trait]
    impl ScrapeFallbackPort for BrokenFallback {
        fn name(&self) -> &str {
            "broken"
        }

        async fn fetch_building_records(&self, _address: &Address, _zip: &str) -> FallbackOutcome {
            panic!("selector not found");
        }
    }

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState {
            lookup: Arc::new(BuildingLookup::new(
                BuildingIdentifierResolver::new(),
                Vec::new(),
            )),
        })
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().configure(crate::configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn missing_zip_is_400() {
        let app =
            test::init_service(App::new().app_data(state()).configure(crate::configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/building-lookup?address=393%20Hewes%20St")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("zip_code"));
    }

    #[actix_web::test]
    async fn unparsable_address_is_400() {
        let app =
            test::init_service(App::new().app_data(state()).configure(crate::configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/building-lookup?address=Hewes%20Street&zip_code=11211")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn no_data_is_an_empty_success() {
        let app =
            test::init_service(App::new().app_data(state()).configure(crate::configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/building-lookup?address=393%20Hewes%20St&zip_code=11211&count=all")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            serde_json::json!({"success": true, "data": {}, "unique_locations": []})
        );
    }

    #[actix_web::test]
    async fn internal_failure_is_a_generic_500() {
        let lookup = BuildingLookup::new(BuildingIdentifierResolver::new(), Vec::new())
            .with_fallback(Arc::new(BrokenFallback));
        let state = web::Data::new(AppState {
            lookup: Arc::new(lookup),
        });
        let app = test::init_service(App::new().app_data(state).configure(crate::configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/building-lookup?address=393%20Hewes%20St&zip_code=11211")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "Internal server error"})
        );
    }

    #[actix_web::test]
    async fn describes_one_dataset() {
        let app =
            test::init_service(App::new().app_data(state()).configure(crate::configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/datasets/lead_violations")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["id"], "lead_violations");
        assert_eq!(body["rangeKeyed"], true);
        assert_eq!(body["active"], false);

        let req = test::TestRequest::get()
            .uri("/api/datasets/parking_tickets")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn lists_registry() {
        let app =
            test::init_service(App::new().app_data(state()).configure(crate::configure)).await;
        let req = test::TestRequest::get().uri("/api/datasets").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let datasets = body.as_array().unwrap();
        assert_eq!(datasets.len(), all_datasets().len());
        assert!(datasets.iter().all(|d| d["active"] == false));
    }
}
