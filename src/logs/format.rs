//! Log line formatting.
//!
//! Raw output from the game server usually carries its own bracketed
//! timestamp, e.g. `[12:00:01] [Server thread/INFO]: Done (3.2s)!`. The
//! formatter strips that leading stamp, re-stamps the line with the
//! manager's wall clock, and classifies it into a [`LogLevel`]. Lines that
//! don't match any pattern pass through untouched as `Info`; a line is
//! never dropped.

use crate::logs::{LogLevel, LogLine};

/// Completion phrases promoted to `Success`. `Done (` matches the vanilla
/// and Fabric "Done (3.2s)! For help, type \"help\"" ready line.
const SUCCESS_PHRASES: &[&str] = &["Done (", "Server started", "successfully"];

/// Current wall-clock time as `HH:MM:SS`.
pub fn current_stamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Returns true if `s` has the shape `HH:MM:SS`.
fn is_clock(s: &str) -> bool {
    s.len() == 8
        && s.chars().enumerate().all(|(i, c)| {
            if i == 2 || i == 5 {
                c == ':'
            } else {
                c.is_ascii_digit()
            }
        })
}

/// Strips one leading `[HH:MM:SS]` stamp, if present, and any whitespace
/// after it. Anything else is returned unchanged.
pub fn strip_stamp(raw: &str) -> &str {
    if let Some(rest) = raw.strip_prefix('[') {
        if rest.len() > 8 && rest.as_bytes().get(8) == Some(&b']') && is_clock(&rest[..8]) {
            return rest[9..].trim_start();
        }
    }
    raw
}

/// Classifies a (stamp-stripped) line into a log level.
///
/// Success phrases win over the keyword vocabulary so that the server's
/// `INFO`-tagged ready line still surfaces as `Success`.
pub fn classify(text: &str) -> LogLevel {
    if SUCCESS_PHRASES.iter().any(|p| text.contains(p)) {
        LogLevel::Success
    } else if text.contains("ERROR") || text.contains("FATAL") {
        LogLevel::Error
    } else if text.contains("WARN") {
        LogLevel::Warn
    } else {
        LogLevel::Info
    }
}

/// Formats one raw output line into a re-stamped, classified [`LogLine`].
pub fn format_line(raw: &str) -> LogLine {
    let text = strip_stamp(raw);
    LogLine {
        timestamp: current_stamp(),
        level: classify(text),
        text: text.to_string(),
    }
}
