use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::metrics::RATE_LIMIT_CLIENTS;

// Rate limit entry - tracks requests per client in the current window
#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    reset_at: Instant,
}

/// Result of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Rejected; `retry_after` is whole seconds until the window resets.
    Limited { retry_after: u64 },
}

impl Admission {
    #[cfg(test)]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Per-client fixed-window counter.
///
/// A client straddling a window boundary can get up to twice `max_requests`
/// through within one `window`. Every mutation goes through the dashmap shard
/// lock, so `admit` and `cleanup` on the same key never interleave.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<RateLimiterInner>,
}

struct RateLimiterInner {
    max_requests: u32,
    window: Duration,
    windows: DashMap<String, RateLimitEntry>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            inner: Arc::new(RateLimiterInner {
                max_requests,
                window,
                windows: DashMap::new(),
            }),
        }
    }

    pub fn admit(&self, client: &str) -> Admission {
        let now = Instant::now();
        let window = self.inner.window;

        let admission = match self.inner.windows.entry(client.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(RateLimitEntry {
                    count: 1,
                    reset_at: now + window,
                });
                Admission::Allowed
            }
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                if now > entry.reset_at {
                    // window expired, start a new one
                    entry.count = 1;
                    entry.reset_at = now + window;
                    Admission::Allowed
                } else if entry.count >= self.inner.max_requests {
                    Admission::Limited {
                        retry_after: seconds_until(entry.reset_at, now),
                    }
                } else {
                    entry.count += 1;
                    Admission::Allowed
                }
            }
        };

        RATE_LIMIT_CLIENTS.set(self.inner.windows.len() as f64);
        admission
    }

    /// Drop every window that expired before now. Returns how many went.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.windows.len();
        self.inner.windows.retain(|_, entry| entry.reset_at >= now);
        let after = self.inner.windows.len();

        RATE_LIMIT_CLIENTS.set(after as f64);
        before.saturating_sub(after)
    }

    /// Number of clients with a tracked window.
    pub fn len(&self) -> usize {
        self.inner.windows.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.inner.windows.is_empty()
    }
}

// Rounded up so a client retrying after the hint lands in a fresh window
fn seconds_until(reset_at: Instant, now: Instant) -> u64 {
    let left = reset_at.saturating_duration_since(now);
    left.as_secs() + u64::from(left.subsec_nanos() > 0)
}
