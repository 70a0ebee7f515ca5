//! Request and response bodies for the management API.

use crate::error::Result;
use crate::logs::LogLine;
use serde::{Deserialize, Serialize};

/// Uniform outcome envelope for mutating endpoints.
///
/// Soft failures (duplicate whitelist entry, stop while stopped) come back
/// as HTTP 200 with `success: false` so polling clients can surface the
/// message without special-casing status codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    /// Collapse a fallible operation yielding a success message.
    pub fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(message) => Self::ok(message),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}

/// Body of `GET /api/logs`.
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub lines: Vec<LogLine>,
    pub fingerprint: u64,
}

/// Query parameters for `GET /api/logs`.
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    /// Tail length when `since` is absent
    pub lines: Option<usize>,
    /// Fingerprint from a previous poll; only newer lines are returned
    pub since: Option<u64>,
}

/// Optional body of `POST /api/server/stop`.
#[derive(Debug, Deserialize)]
pub struct StopRequest {
    pub grace_secs: Option<u64>,
}

/// Body of `POST /api/server/command`.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
}

/// Body of `POST /api/config`: property keys mapped to new values. Each
/// result message names its key, so response order does not matter.
pub type PropertyUpdates = std::collections::HashMap<String, String>;

/// Body for whitelist and op removal and player unban requests.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// Body of `POST /api/ops`.
#[derive(Debug, Deserialize)]
pub struct OpRequest {
    pub name: String,
    pub level: Option<u8>,
}

/// Body of `POST /api/banned-players`.
#[derive(Debug, Deserialize)]
pub struct BanRequest {
    pub name: String,
    pub reason: Option<String>,
}

/// Body for IP ban and unban requests.
#[derive(Debug, Deserialize)]
pub struct IpRequest {
    pub ip: String,
    pub reason: Option<String>,
}

/// Body of `POST /api/server/kill-all`.
#[derive(Debug, Serialize)]
pub struct KillAllResponse {
    pub success: bool,
    pub message: String,
    pub killed: usize,
}
