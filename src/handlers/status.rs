use axum::{
    Json,
    extract::{ConnectInfo, FromRequestParts, State},
    http::request::Parts,
};
use chrono::Utc;
use std::convert::Infallible;
use std::net::SocketAddr;
use tracing::debug;

use crate::error::AppError;
use crate::metrics::{RATE_LIMITED_TOTAL, REQUEST_TOTAL};
use crate::models::StatusResponse;
use crate::rate_limit::Admission;
use crate::state::AppState;

/// Rate limit key of the caller: the peer IP address.
///
/// Falls back to `"unknown"` when the server was not started with connect
/// info, so all such callers share one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl<S> FromRequestParts<S> for ClientKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(ClientKey(key))
    }
}

pub async fn status_handler(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
) -> Result<Json<StatusResponse>, AppError> {
    REQUEST_TOTAL.inc();

    if let Admission::Limited { retry_after } = state.limiter.admit(&client) {
        RATE_LIMITED_TOTAL.inc();
        debug!(%client, retry_after, "rate limited");
        return Err(AppError::RateLimited { retry_after });
    }

    let (status, cached) = state.cache.get().await;

    Ok(Json(StatusResponse {
        status,
        timestamp: Utc::now(),
        cached,
    }))
}
