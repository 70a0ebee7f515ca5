//! Error handling module for mc-manager.
//!
//! This module defines the error types used throughout the crate.
//! Supervisor operations return these typed errors rather than panicking,
//! and the web layer flattens them into `{success, message}` responses.
//!
//! # Example
//!
//! ```
//! use mc_manager::error::{Error, Result};
//!
//! fn handle_error(result: Result<()>) {
//!     match result {
//!         Ok(_) => println!("Operation succeeded"),
//!         Err(Error::AlreadyRunning) => println!("The server is already running"),
//!         Err(Error::NotRunning) => println!("The server is not running"),
//!         Err(e) => println!("Other error: {}", e),
//!     }
//! }
//! ```
use thiserror::Error;

/// Errors that can occur in the mc-manager crate.
///
/// Each variant includes context information to help diagnose and handle
/// the error appropriately.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to parse configuration from a file or string.
    ///
    /// This error occurs when:
    /// - The configuration JSON is malformed
    /// - Required fields are missing
    /// - Field types are incorrect
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration is valid JSON but contains values that fail validation.
    ///
    /// This error occurs when:
    /// - The launch command is empty
    /// - The server directory doesn't exist
    /// - A timeout or capacity is outside the allowed range
    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    /// The managed process could not be spawned.
    ///
    /// This error occurs when:
    /// - The executable is missing from PATH
    /// - The working directory is invalid
    #[error("Failed to spawn server process: {0}")]
    Spawn(String),

    /// Error communicating with or reaping the managed process.
    ///
    /// This error occurs when:
    /// - Writing to the process stdin fails
    /// - The process cannot be killed or waited on
    #[error("Server process error: {0}")]
    Process(String),

    /// The server is already running.
    ///
    /// Returned by `start` when the state machine is not in `Stopped`.
    #[error("Server is already running")]
    AlreadyRunning,

    /// The server is not running.
    ///
    /// Returned by `stop` and `send_command` when the state machine is not
    /// in `Running`. Callers should re-check status and retry if needed.
    #[error("Server is not running")]
    NotRunning,

    /// A data-file operation (properties, roster, backup, mods) failed its
    /// precondition, e.g. adding a player that is already whitelisted or
    /// deleting a backup that doesn't exist.
    ///
    /// The message is human-readable and suitable for the web response.
    #[error("{0}")]
    Data(String),

    /// Error reading or writing a file under the server directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error in serializing or deserializing data.
    ///
    /// This error occurs when:
    /// - A roster JSON file is malformed beyond recovery
    /// - A response payload can't be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other error not covered by the above categories.
    #[error("Other error: {0}")]
    Other(String),
}

/// Result type for mc-manager operations.
///
/// This is a convenience type alias for `std::result::Result` with the
/// `Error` type from this module.
pub type Result<T> = std::result::Result<T, Error>;
