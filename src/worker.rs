use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::rate_limit::RateLimiter;

// Sweep expired rate limit windows every `every` until `shutdown` fires.
// First sweep happens one full period after start.
pub fn spawn_cleanup(
    limiter: RateLimiter,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Rate limit cleanup started (interval: {:?})", every);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Rate limit cleanup stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = limiter.cleanup();
                    debug!(removed, remaining = limiter.len(), "swept rate limit windows");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sweeps_expired_windows_until_cancelled() {
        let limiter = RateLimiter::new(10, Duration::from_millis(10));
        limiter.admit("10.0.0.1");
        limiter.admit("10.0.0.2");

        let shutdown = CancellationToken::new();
        let handle = spawn_cleanup(limiter.clone(), Duration::from_millis(30), shutdown.clone());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(limiter.is_empty());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("cleanup task did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn leaves_live_windows_alone() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        limiter.admit("10.0.0.1");

        let shutdown = CancellationToken::new();
        let handle = spawn_cleanup(limiter.clone(), Duration::from_millis(10), shutdown.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(limiter.len(), 1);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
