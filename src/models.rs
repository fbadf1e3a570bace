use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Last known state of the hidden service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Unknown,
    Online,
    Offline,
}

// GET /api/status
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: Status,
    pub timestamp: DateTime<Utc>,
    pub cached: bool,
}

// 429 body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitedResponse {
    pub error: String,
    pub retry_after: u64,
}

// 500 body, the status is always reported as offline
#[derive(Debug, Serialize, Deserialize)]
pub struct InternalErrorResponse {
    pub status: Status,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

// GET /health
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime: f64, // seconds since start
}

// GET /
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub service: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}
