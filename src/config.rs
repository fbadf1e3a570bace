use clap::Parser;
use std::time::Duration;

pub const SERVICE_NAME: &str = "Onion Status Checker";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Fixed limits, not exposed as flags
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
pub const CACHE_TTL: Duration = Duration::from_secs(30);
pub const RATE_WINDOW: Duration = Duration::from_secs(60);
pub const RATE_MAX_REQUESTS: u32 = 10;
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

// CLI argument structure, every flag falls back to its environment variable
#[derive(Parser, Debug, Clone)]
#[command(name = "onion-status")]
#[command(about = "Reports reachability of a hidden service through Tor")]
#[command(version)]
pub struct Args {
    // Hidden service to probe
    #[arg(long, env = "ONION_URL", default_value = "http://your-domain-here.onion")]
    pub onion_url: String,

    // Proxy URI used for both http and https
    // Example: "socks5h://127.0.0.1:9050"
    #[arg(long, env = "TOR_PROXY", default_value = "socks5h://127.0.0.1:9050")]
    pub tor_proxy: String,

    // Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    // Allowed CORS origin(s) for /api/*, "*" or comma-separated list
    #[arg(long, env = "CORS_ORIGIN", default_value = "*")]
    pub cors_origin: String,
}

impl Args {
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
