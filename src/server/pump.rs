use crate::logs::{LogLevel, LogStore, format};
use async_process::{ChildStderr, ChildStdout};
use futures_lite::io::{AsyncBufReadExt, AsyncRead, BufReader};
use futures_lite::stream::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Background task draining the server's output pipes into the log store.
///
/// One pump exists per live process, spawned right after the process itself.
/// It ends when both streams reach end-of-stream (process exit closes the
/// pipes) and is awaited by the supervisor's `stop` before the state machine
/// reports Stopped. The pump only touches the log store, never the
/// supervisor's lock, so draining is not blocked by a slow stop/start caller.
pub struct OutputPump;

impl OutputPump {
    /// Spawn the pump over the given pipes.
    pub fn spawn(stdout: ChildStdout, stderr: ChildStderr, logs: Arc<LogStore>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let out = drain(stdout, Arc::clone(&logs));
            let err = drain(stderr, Arc::clone(&logs));
            futures_lite::future::zip(out, err).await;
            tracing::debug!("Output pump finished");
        })
    }
}

/// Read one pipe line by line until EOF, formatting each line into the
/// store. A read error ends this side of the pump early, leaving an
/// Error-level line behind; a line is never silently dropped.
async fn drain(stream: impl AsyncRead + Unpin, logs: Arc<LogStore>) {
    let mut lines = BufReader::new(stream).lines();
    while let Some(next) = lines.next().await {
        match next {
            Ok(raw) => {
                let raw = raw.trim_end_matches(['\r', '\n']);
                if !raw.is_empty() {
                    logs.append_line(format::format_line(raw));
                }
            }
            Err(e) => {
                logs.append(LogLevel::Error, format!("Output stream read error: {}", e));
                break;
            }
        }
    }
}
