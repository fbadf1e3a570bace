use axum::{Json, extract::State};

use crate::config::{SERVICE_NAME, VERSION};
use crate::models::HealthResponse;
use crate::state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}
