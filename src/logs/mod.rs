//! Log capture module for mc-manager.
//!
//! Server output is formatted line by line ([`format`]) and appended to a
//! bounded, fingerprinted buffer ([`LogStore`]) that the web layer polls.
//! The store mirrors every line to `logs/unified.log` on disk.

pub mod format;
mod store;

pub use store::{LogLevel, LogLine, LogStore};
