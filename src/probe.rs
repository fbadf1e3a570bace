use reqwest::{Client, Proxy, Url, redirect};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::metrics::PROBE_LATENCY;
use crate::models::Status;

pub const USER_AGENT: &str = concat!("onion-status/", env!("CARGO_PKG_VERSION"));

/// Outcome of a single probe. There is no error case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

impl From<Reachability> for Status {
    fn from(r: Reachability) -> Self {
        match r {
            Reachability::Reachable => Status::Online,
            Reachability::Unreachable => Status::Offline,
        }
    }
}

/// Raised only while building the probe, never by `check`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid target url {url:?}: {source}")]
    InvalidTarget {
        url: String,
        source: url::ParseError,
    },

    #[error("invalid proxy uri {uri:?}: {source}")]
    InvalidProxy { uri: String, source: reqwest::Error },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Header-only existence check of one target through a forward proxy.
pub struct ProxiedProbe {
    client: Client,
    target: Url,
    timeout: Duration,
}

impl ProxiedProbe {
    /// Build a probe for `target`.
    ///
    /// The proxy, when given, is used for both http and https. `socks5h://`
    /// leaves name resolution to the proxy, which `.onion` hosts require.
    /// With `None` the client connects directly and ignores any proxy set in
    /// the environment. Redirects are not followed, so a 3xx from the target
    /// is its own answer and counts as unreachable.
    pub fn new(target: &str, proxy: Option<&str>, timeout: Duration) -> Result<Self, ProbeError> {
        let target = Url::parse(target).map_err(|source| ProbeError::InvalidTarget {
            url: target.to_string(),
            source,
        })?;

        let builder = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(redirect::Policy::none());
        let builder = match proxy {
            Some(uri) => {
                let proxy = Proxy::all(uri).map_err(|source| ProbeError::InvalidProxy {
                    uri: uri.to_string(),
                    source,
                })?;
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };
        let client = builder.build().map_err(ProbeError::Client)?;

        Ok(Self {
            client,
            target,
            timeout,
        })
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Issue one HEAD request. Only a 2xx answer counts as reachable;
    /// transport errors, timeouts and every other status are unreachable.
    pub async fn check(&self) -> Reachability {
        debug!(url = %self.target, "probing");
        let started = Instant::now();

        let result = self.client.head(self.target.clone()).send().await;
        PROBE_LATENCY.observe(started.elapsed().as_secs_f64());

        match result {
            Ok(res) if res.status().is_success() => {
                info!(url = %self.target, status = %res.status(), "target reachable");
                Reachability::Reachable
            }
            Ok(res) => {
                warn!(url = %self.target, status = %res.status(), "target answered with failure status");
                Reachability::Unreachable
            }
            Err(e) if e.is_timeout() => {
                warn!(url = %self.target, timeout = ?self.timeout, "probe timed out");
                Reachability::Unreachable
            }
            Err(e) => {
                warn!(url = %self.target, error = %e, "probe failed");
                Reachability::Unreachable
            }
        }
    }
}
