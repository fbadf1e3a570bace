use axum::Json;
use std::collections::BTreeMap;

use crate::config::{SERVICE_NAME, VERSION};
use crate::models::RootResponse;

// Service banner with the endpoint map
pub async fn root_handler() -> Json<RootResponse> {
    let endpoints = BTreeMap::from([
        ("/api/status".to_string(), "Check hidden service status".to_string()),
        ("/health".to_string(), "Health check".to_string()),
        ("/metrics".to_string(), "Prometheus metrics".to_string()),
    ]);

    Json(RootResponse {
        service: format!("{SERVICE_NAME} API"),
        version: VERSION.to_string(),
        endpoints,
    })
}
