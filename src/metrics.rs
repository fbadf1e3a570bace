use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, TextEncoder, register_counter, register_gauge,
    register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("onion_status_requests_total", "Total number of status requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("onion_status_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("onion_status_cache_hits_total", "Status reads served from cache").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("onion_status_cache_misses_total", "Status reads that triggered a probe").unwrap();
    pub static ref PROBE_LATENCY: Histogram = register_histogram!(
        "onion_status_probe_latency_seconds",
        "Probe round trip through the proxy in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_CLIENTS: Gauge =
        register_gauge!("onion_status_rate_limit_clients", "Clients with a tracked rate limit window").unwrap();
}

// Render the default registry in Prometheus text format
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
