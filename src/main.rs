mod cache;
mod config;
mod error;
mod handlers;
mod metrics;
mod models;
mod probe;
mod rate_limit;
mod server;
mod state;
mod worker;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cache::StatusCache;
use crate::config::{
    Args, CACHE_TTL, CLEANUP_INTERVAL, PROBE_TIMEOUT, RATE_MAX_REQUESTS, RATE_WINDOW,
};
use crate::probe::ProxiedProbe;
use crate::rate_limit::RateLimiter;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // parse cli arguments / environment
    let args = Args::parse();

    let probe = ProxiedProbe::new(&args.onion_url, Some(&args.tor_proxy), PROBE_TIMEOUT)
        .context("building proxied probe")?;
    let cors = server::cors_layer(&args.cors_origin)
        .with_context(|| format!("invalid CORS_ORIGIN {:?}", args.cors_origin))?;

    let limiter = RateLimiter::new(RATE_MAX_REQUESTS, RATE_WINDOW);
    let state = AppState::new(StatusCache::new(probe, CACHE_TTL), limiter.clone());

    let shutdown = CancellationToken::new();
    let cleanup = worker::spawn_cleanup(limiter, CLEANUP_INTERVAL, shutdown.clone());
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!("Status checker running on http://{}", addr);
    info!("Monitoring: {}", args.onion_url);
    info!("Tor proxy: {}", args.tor_proxy);
    info!("CORS origin: {}", args.cors_origin);
    info!(
        "Cache TTL: {:?}, rate limit: {} requests per {:?}",
        CACHE_TTL, RATE_MAX_REQUESTS, RATE_WINDOW
    );

    let result = server::serve(listener, server::router(state, cors), shutdown.clone()).await;

    // make sure the sweeper stops even if the server failed on its own
    shutdown.cancel();
    if let Err(e) = cleanup.await {
        warn!(error = %e, "cleanup task ended abnormally");
    }

    result.context("http server failed")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
    shutdown.cancel();
}
