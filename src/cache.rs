use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::metrics::{CACHE_HITS, CACHE_MISSES};
use crate::models::Status;
use crate::probe::ProxiedProbe;

// Cache entry with timestamp, `None` until the first probe lands
#[derive(Clone, Copy, Debug, Default)]
struct CacheEntry {
    status: Status,
    checked_at: Option<Instant>,
}

impl CacheEntry {
    fn fresh(&self, ttl: Duration) -> Option<Status> {
        match self.checked_at {
            Some(at) if at.elapsed() < ttl => Some(self.status),
            _ => None,
        }
    }
}

/// Time-bounded memo of the last probe result.
///
/// Reads take a shared lock on the cell. A miss goes through `refresh`, an
/// async mutex held across the probe, so concurrent misses share one probe:
/// whoever queues behind an in-flight refresh finds the new entry already
/// fresh and returns it as a cache hit.
pub struct StatusCache {
    probe: ProxiedProbe,
    ttl: Duration,
    entry: RwLock<CacheEntry>,
    refresh: Mutex<()>,
}

impl StatusCache {
    pub fn new(probe: ProxiedProbe, ttl: Duration) -> Self {
        Self {
            probe,
            ttl,
            entry: RwLock::new(CacheEntry::default()),
            refresh: Mutex::new(()),
        }
    }

    /// Current status and whether it was served without probing.
    pub async fn get(&self) -> (Status, bool) {
        if let Some(status) = self.entry.read().await.fresh(self.ttl) {
            CACHE_HITS.inc();
            return (status, true);
        }

        let _refresh = self.refresh.lock().await;

        // another caller may have refreshed while we waited
        if let Some(status) = self.entry.read().await.fresh(self.ttl) {
            CACHE_HITS.inc();
            return (status, true);
        }

        CACHE_MISSES.inc();
        debug!(url = %self.probe.target(), "status cache miss");

        let status = Status::from(self.probe.check().await);
        *self.entry.write().await = CacheEntry {
            status,
            checked_at: Some(Instant::now()),
        };
        (status, false)
    }

    // Last stored status without probing
    #[cfg(test)]
    async fn peek(&self) -> Status {
        self.entry.read().await.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn target(template: ResponseTemplate, expected_probes: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(template)
            .expect(expected_probes)
            .mount(&server)
            .await;
        server
    }

    fn cache_for(server: &MockServer, ttl: Duration) -> StatusCache {
        let probe = ProxiedProbe::new(&server.uri(), None, Duration::from_secs(2)).unwrap();
        StatusCache::new(probe, ttl)
    }

    #[tokio::test]
    async fn starts_unknown() {
        let server = target(ResponseTemplate::new(200), 0).await;
        let cache = cache_for(&server, Duration::from_secs(30));
        assert_eq!(cache.peek().await, Status::Unknown);
    }

    #[tokio::test]
    async fn serves_from_cache_within_ttl() {
        let server = target(ResponseTemplate::new(200), 1).await;
        let cache = cache_for(&server, Duration::from_secs(30));

        assert_eq!(cache.get().await, (Status::Online, false));
        for _ in 0..5 {
            assert_eq!(cache.get().await, (Status::Online, true));
        }
        assert_eq!(cache.peek().await, Status::Online);
    }

    #[tokio::test]
    async fn failed_probe_is_cached_as_offline() {
        let server = target(ResponseTemplate::new(500), 1).await;
        let cache = cache_for(&server, Duration::from_secs(30));

        assert_eq!(cache.get().await, (Status::Offline, false));
        assert_eq!(cache.get().await, (Status::Offline, true));
    }

    #[tokio::test]
    async fn reprobes_once_after_ttl() {
        let server = target(ResponseTemplate::new(200), 2).await;
        let cache = cache_for(&server, Duration::from_millis(100));

        assert_eq!(cache.get().await, (Status::Online, false));
        assert_eq!(cache.get().await, (Status::Online, true));

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get().await, (Status::Online, false));
        assert_eq!(cache.get().await, (Status::Online, true));
    }

    #[tokio::test]
    async fn picks_up_status_change_after_ttl() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        let cache = cache_for(&server, Duration::from_millis(50));

        assert_eq!(cache.get().await, (Status::Online, false));
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get().await, (Status::Offline, false));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_misses_share_one_probe() {
        let server = target(
            ResponseTemplate::new(200).set_delay(Duration::from_millis(200)),
            1,
        )
        .await;
        let cache = Arc::new(cache_for(&server, Duration::from_secs(30)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get().await })
            })
            .collect();

        let mut fresh = 0;
        for handle in handles {
            let (status, cached) = handle.await.unwrap();
            assert_eq!(status, Status::Online);
            if !cached {
                fresh += 1;
            }
        }
        assert_eq!(fresh, 1);
    }
}
