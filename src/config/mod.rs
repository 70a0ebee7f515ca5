//! Configuration module for mc-manager.
//!
//! This module handles parsing, validation, and access to configuration
//! settings for the manager: how to launch the game server, where its
//! installation lives, shutdown timeouts, log retention, and the web API
//! bind address. Configurations load from files or strings in JSON format.
//!
//! # Examples
//!
//! Loading a configuration from a file:
//!
//! ```no_run
//! use mc_manager::config::ManagerConfig;
//!
//! let config = ManagerConfig::from_file("config.json").unwrap();
//! println!("Managing server in {}", config.server_dir.display());
//! ```
mod parser;
pub mod validator;

pub use parser::{
    DEFAULT_GRACE_PERIOD_SECS, DEFAULT_KILL_TIMEOUT_SECS, DEFAULT_LOG_CAPACITY,
    DEFAULT_LOG_VIEW_LINES, DEFAULT_PROCESS_PATTERN, DEFAULT_WORKERS, HttpConfig, ManagerConfig,
    ServerConfig,
};
pub use validator::validate_config;
