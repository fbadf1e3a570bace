mod health;
mod metrics;
mod root;
mod status;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use root::root_handler;
pub use status::status_handler;
