use crate::logs::format;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Severity of a formatted log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Regular server output
    Info,
    /// Server warning
    Warn,
    /// Server or manager error
    Error,
    /// Known completion phrase (server finished starting, command done)
    Success,
    /// Operator command echoed back into the stream
    Command,
}

impl LogLevel {
    fn tag(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
            LogLevel::Command => "COMMAND",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "INFO" => Some(LogLevel::Info),
            "WARN" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            "SUCCESS" => Some(LogLevel::Success),
            "COMMAND" => Some(LogLevel::Command),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One formatted entry in the log stream.
///
/// Immutable once appended; the ordering in the store is arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Manager wall-clock stamp, `HH:MM:SS`.
    pub timestamp: String,
    /// Classified severity.
    pub level: LogLevel,
    /// Line text with the server's own stamp stripped.
    pub text: String,
}

struct Inner {
    lines: VecDeque<LogLine>,
    /// Total number of lines ever appended. Monotonic; survives FIFO
    /// eviction, so it doubles as the change-detection fingerprint.
    fingerprint: u64,
}

/// Append-only formatted log buffer backing the polling log API.
///
/// Safe for concurrent use: the buffer sits behind its own mutex,
/// independent of the supervisor's exclusion lock, so appends from the
/// output pump never contend with a slow `stop` and poll reads never block
/// on a mid-grace-period shutdown.
///
/// Every appended line is also mirrored to an append-only `unified.log`
/// file so the log view survives restarts of the manager itself. Mirror
/// failures are logged and otherwise ignored.
pub struct LogStore {
    inner: Mutex<Inner>,
    capacity: usize,
    mirror: Mutex<Option<File>>,
    mirror_path: Option<PathBuf>,
}

impl LogStore {
    /// Creates an in-memory store with the given retention cap.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                lines: VecDeque::new(),
                fingerprint: 0,
            }),
            capacity,
            mirror: Mutex::new(None),
            mirror_path: None,
        }
    }

    /// Creates a store mirrored to `logs/unified.log` under `server_dir`,
    /// reloading the most recent lines from an existing mirror file.
    pub fn with_mirror(capacity: usize, server_dir: &Path) -> Self {
        let mirror_path = server_dir.join("logs").join("unified.log");
        let mut store = Self::new(capacity);
        store.mirror_path = Some(mirror_path.clone());
        store.reload_from_mirror(&mirror_path);
        store
    }

    /// Loads the tail of a previous mirror file into the buffer without
    /// re-writing it. Unparseable lines are skipped.
    fn reload_from_mirror(&self, path: &Path) {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(_) => return,
        };

        let mut inner = self.inner.lock().unwrap();
        for line in BufReader::new(file).lines().map_while(|l| l.ok()) {
            if let Some(parsed) = parse_mirror_line(&line) {
                inner.lines.push_back(parsed);
                inner.fingerprint += 1;
                if inner.lines.len() > self.capacity {
                    inner.lines.pop_front();
                }
            }
        }
        if inner.fingerprint > 0 {
            tracing::debug!(
                lines = inner.lines.len(),
                path = %path.display(),
                "Reloaded log tail from mirror file"
            );
        }
    }

    /// Appends a pre-formatted line.
    pub fn append_line(&self, line: LogLine) {
        self.write_mirror(&line);
        let mut inner = self.inner.lock().unwrap();
        inner.lines.push_back(line);
        inner.fingerprint += 1;
        if inner.lines.len() > self.capacity {
            inner.lines.pop_front();
        }
    }

    /// Stamps `text` with the current wall clock and appends it.
    pub fn append(&self, level: LogLevel, text: impl Into<String>) {
        self.append_line(LogLine {
            timestamp: format::current_stamp(),
            level,
            text: text.into(),
        });
    }

    /// Returns up to the most recent `max_lines` entries in arrival order,
    /// plus the current fingerprint.
    pub fn read_tail(&self, max_lines: usize) -> (Vec<LogLine>, u64) {
        let inner = self.inner.lock().unwrap();
        let skip = inner.lines.len().saturating_sub(max_lines);
        (
            inner.lines.iter().skip(skip).cloned().collect(),
            inner.fingerprint,
        )
    }

    /// Returns the lines appended since `fingerprint` plus the new
    /// fingerprint. If nothing changed, the result is empty and the
    /// fingerprint is returned unchanged, letting pollers skip rendering.
    ///
    /// A caller whose fingerprint has fallen behind the retention cap gets
    /// whatever still lives in the buffer; evicted lines are gone.
    pub fn read_since(&self, fingerprint: u64) -> (Vec<LogLine>, u64) {
        let inner = self.inner.lock().unwrap();
        if fingerprint >= inner.fingerprint {
            return (Vec::new(), inner.fingerprint);
        }
        let new = (inner.fingerprint - fingerprint) as usize;
        let skip = inner.lines.len().saturating_sub(new);
        (
            inner.lines.iter().skip(skip).cloned().collect(),
            inner.fingerprint,
        )
    }

    /// Current fingerprint without reading any lines.
    pub fn fingerprint(&self) -> u64 {
        self.inner.lock().unwrap().fingerprint
    }

    fn write_mirror(&self, line: &LogLine) {
        let Some(path) = &self.mirror_path else {
            return;
        };

        let mut mirror = self.mirror.lock().unwrap();
        if mirror.is_none() {
            if let Some(parent) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    tracing::warn!(error = %e, "Failed to create log directory");
                    return;
                }
            }
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(f) => *mirror = Some(f),
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Failed to open log mirror");
                    return;
                }
            }
        }

        if let Some(file) = mirror.as_mut() {
            if let Err(e) = writeln!(file, "[{}] [{}] {}", line.timestamp, line.level, line.text) {
                tracing::warn!(error = %e, "Failed to write log mirror");
                *mirror = None;
            }
        }
    }
}

/// Parses a `[HH:MM:SS] [LEVEL] text` mirror line.
fn parse_mirror_line(raw: &str) -> Option<LogLine> {
    let rest = raw.strip_prefix('[')?;
    let (timestamp, rest) = rest.split_once("] [")?;
    let (tag, text) = rest.split_once("] ")?;
    Some(LogLine {
        timestamp: timestamp.to_string(),
        level: LogLevel::from_tag(tag)?,
        text: text.to_string(),
    })
}
