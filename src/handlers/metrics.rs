use axum::{http::header, response::IntoResponse};

use crate::error::AppError;
use crate::metrics;

pub async fn metrics_handler() -> Result<impl IntoResponse, AppError> {
    let body = metrics::render().map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
