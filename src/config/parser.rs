use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default grace period, in seconds, allowed for the server to exit after the
/// in-game `stop` command before it is force-killed.
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 30;

/// Default secondary timeout, in seconds, to reap the process after a force kill.
pub const DEFAULT_KILL_TIMEOUT_SECS: u64 = 5;

/// Default number of log lines retained in memory for the polling API.
pub const DEFAULT_LOG_CAPACITY: usize = 500;

/// Default number of log lines returned by a tail request.
pub const DEFAULT_LOG_VIEW_LINES: usize = 100;

/// Default executable-name pattern matched by the kill-all escape hatch.
pub const DEFAULT_PROCESS_PATTERN: &str = "java";

/// Default number of HTTP workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Configuration for the managed game-server process.
///
/// This structure defines how to launch the server: the command to execute,
/// any arguments to pass, and optional environment variables to set.
///
/// # Examples
///
/// ```
/// use mc_manager::config::ServerConfig;
/// use std::collections::HashMap;
///
/// let server_config = ServerConfig {
///     command: "java".to_string(),
///     args: vec![
///         "-Xmx2G".to_string(),
///         "-jar".to_string(),
///         "fabric-server-launch.jar".to_string(),
///         "nogui".to_string(),
///     ],
///     env: HashMap::new(),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Command to execute when starting the server.
    /// This can be an absolute path or a command available in the PATH.
    pub command: String,

    /// Command-line arguments to pass to the server.
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment variables to set when launching the server.
    /// These will be combined with the current environment.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// Configuration for the HTTP facade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Address to bind the web API to.
    #[serde(default = "default_address")]
    pub address: String,

    /// Port to bind the web API to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of HTTP worker threads.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_grace_period() -> u64 {
    DEFAULT_GRACE_PERIOD_SECS
}

fn default_kill_timeout() -> u64 {
    DEFAULT_KILL_TIMEOUT_SECS
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

fn default_process_pattern() -> String {
    DEFAULT_PROCESS_PATTERN.to_string()
}

/// Main configuration for the manager.
///
/// # JSON Schema
///
/// ```json
/// {
///   "server": {
///     "command": "java",
///     "args": ["-Xmx2G", "-jar", "fabric-server-launch.jar", "nogui"],
///     "env": {}
///   },
///   "serverDir": "./data",
///   "gracePeriodSecs": 30,
///   "killTimeoutSecs": 5,
///   "logCapacity": 500,
///   "processPattern": "java",
///   "http": { "address": "127.0.0.1", "port": 5000, "workers": 4 }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerConfig {
    /// How to launch the managed game server.
    pub server: ServerConfig,

    /// Directory holding the server installation. Used as the process working
    /// directory and as the root for properties, rosters, logs, and backups.
    pub server_dir: PathBuf,

    /// Seconds to wait for a graceful exit before force-killing.
    #[serde(default = "default_grace_period")]
    pub grace_period_secs: u64,

    /// Seconds to wait for the process to be reaped after a force kill.
    #[serde(default = "default_kill_timeout")]
    pub kill_timeout_secs: u64,

    /// Number of log lines retained in memory.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    /// Executable-name pattern matched by the kill-all escape hatch.
    #[serde(default = "default_process_pattern")]
    pub process_pattern: String,

    /// HTTP facade settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl ManagerConfig {
    /// Loads a configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The file cannot be read
    /// * The file contents are not valid JSON
    /// * The JSON does not conform to the expected schema
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigParse(format!("Failed to read config file: {}", e)))?;

        Self::parse_from_str(&content)
    }

    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid JSON or does not conform
    /// to the expected schema.
    pub fn parse_from_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::ConfigParse(format!("Failed to parse JSON config: {}", e)))
    }

    /// The grace period as a `Duration`.
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    /// The force-kill reap timeout as a `Duration`.
    pub fn kill_timeout(&self) -> Duration {
        Duration::from_secs(self.kill_timeout_secs)
    }
}
