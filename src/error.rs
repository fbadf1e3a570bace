use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use thiserror::Error;

use crate::models::{InternalErrorResponse, RateLimitedResponse, Status};

/// Failures that reach the HTTP boundary.
///
/// Probe failures never show up here; they are folded into `Status::Offline`
/// before the handler sees them.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("too many requests, retry in {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("internal failure: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::RateLimited { retry_after } => {
                let body = RateLimitedResponse {
                    error: "Too many requests".to_string(),
                    retry_after,
                };
                let mut res = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                res.headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
                res
            }
            AppError::Internal(detail) => {
                // detail stays in the logs
                tracing::error!(error = %detail, "request failed");
                let body = InternalErrorResponse {
                    status: Status::Offline,
                    error: "Internal server error".to_string(),
                    timestamp: Utc::now(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body_json(res: Response) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn rate_limited_sets_retry_header() {
        let res = AppError::RateLimited { retry_after: 17 }.into_response();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(res.headers()[header::RETRY_AFTER], "17");

        let body = body_json(res).await;
        assert_eq!(body["error"], "Too many requests");
        assert_eq!(body["retryAfter"], 17);
    }

    #[tokio::test]
    async fn internal_does_not_leak_detail() {
        let res = AppError::Internal("encoder exploded at byte 12".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(res).await;
        assert_eq!(body["status"], "offline");
        assert_eq!(body["error"], "Internal server error");
        assert!(body["timestamp"].is_string());
        assert!(!body.to_string().contains("encoder"));
    }
}
