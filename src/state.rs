use std::sync::Arc;
use std::time::Instant;

use crate::cache::StatusCache;
use crate::rate_limit::RateLimiter;

// app's shared state, cheap to clone into every handler
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<StatusCache>,
    pub limiter: RateLimiter,
    pub started_at: Instant, // for /health uptime
}

impl AppState {
    pub fn new(cache: StatusCache, limiter: RateLimiter) -> Self {
        Self {
            cache: Arc::new(cache),
            limiter,
            started_at: Instant::now(),
        }
    }
}
