use axum::{
    Router,
    http::{HeaderValue, Method, header, header::InvalidHeaderValue},
    response::{IntoResponse, Response},
    routing::get,
};
use std::any::Any;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppError;
use crate::handlers::{health_handler, metrics_handler, root_handler, status_handler};
use crate::state::AppState;

/// CORS policy for `/api/*`: GET only, `Content-Type` only.
///
/// `origin` is either `*` or a comma-separated list of exact origins.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let allow_origin = if origin.trim() == "*" {
        AllowOrigin::any()
    } else {
        let origins = origin
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(HeaderValue::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(allow_origin))
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/api/status", get(status_handler))
        .layer(cors);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(api)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// A panicking handler becomes the generic 500 body
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}

/// Serve until `shutdown` is cancelled. Peer addresses are recorded for the
/// rate limiter.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown.cancelled().await;
        info!("HTTP server shutting down");
    })
    .await
}
