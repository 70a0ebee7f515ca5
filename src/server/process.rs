use crate::config::ServerConfig;
use crate::error::{Error, Result};
use async_process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use futures_lite::io::AsyncWriteExt;
use std::path::Path;
use std::time::Duration;
use sysinfo::{ProcessesToUpdate, System};
use tokio::time::timeout;

/// How a `terminate` call brought the process down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Exited within the grace period after the `stop` command
    Graceful,
    /// Grace period expired; the process was force-killed
    Forced,
}

/// The managed game-server OS process.
///
/// Owns the child and its stdin; stdout/stderr are handed off to the output
/// pump right after spawn. Created on `start`, destroyed on confirmed exit.
pub struct GameProcess {
    /// Child process
    child: Child,
    /// Process id captured at spawn time
    pid: u32,
}

impl GameProcess {
    /// Spawn the server process with piped stdio.
    ///
    /// Fails with [`Error::Spawn`] if the executable is missing or the
    /// working directory is invalid.
    pub fn spawn(config: &ServerConfig, working_dir: &Path) -> Result<Self> {
        if !working_dir.is_dir() {
            return Err(Error::Spawn(format!(
                "Working directory does not exist: {}",
                working_dir.display()
            )));
        }

        let mut command = Command::new(&config.command);
        command.args(&config.args);

        // Set environment variables
        for (key, value) in &config.env {
            command.env(key, value);
        }

        command
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = command
            .spawn()
            .map_err(|e| Error::Spawn(format!("Failed to start process: {}", e)))?;
        let pid = child.id();

        tracing::info!(pid = pid, command = %config.command, "Spawned server process");
        Ok(Self { child, pid })
    }

    /// The OS process id.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Non-blocking liveness check: true while the exit status has not been
    /// collected yet.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_status(), Ok(None))
    }

    /// Write a line plus newline to the process's stdin.
    pub async fn write_line(&mut self, text: &str) -> Result<()> {
        let stdin = self.child.stdin.as_mut().ok_or(Error::NotRunning)?;
        stdin
            .write_all(format!("{}\n", text).as_bytes())
            .await
            .map_err(|e| Error::Process(format!("Failed to write to stdin: {}", e)))?;
        stdin
            .flush()
            .await
            .map_err(|e| Error::Process(format!("Failed to flush stdin: {}", e)))?;
        Ok(())
    }

    /// Take the stdout pipe from the process
    pub fn take_stdout(&mut self) -> Result<ChildStdout> {
        self.child
            .stdout
            .take()
            .ok_or_else(|| Error::Process("Failed to get stdout pipe from child process".to_string()))
    }

    /// Take the stderr pipe from the process
    pub fn take_stderr(&mut self) -> Result<ChildStderr> {
        self.child
            .stderr
            .take()
            .ok_or_else(|| Error::Process("Failed to get stderr pipe from child process".to_string()))
    }

    /// Terminate the process: write the graceful `stop` command, wait up to
    /// `grace`, then force-kill and wait up to `kill_timeout` for the reap.
    ///
    /// Returns how the process went down, or [`Error::Process`] if it could
    /// not be reaped even after the force kill.
    pub async fn terminate(&mut self, grace: Duration, kill_timeout: Duration) -> Result<Termination> {
        // The process may already be gone (external kill); the write failure
        // is not interesting in that case.
        if let Err(e) = self.write_line("stop").await {
            tracing::debug!(error = %e, "Graceful stop command could not be written");
        }

        if let Ok(status) = timeout(grace, self.child.status()).await {
            status.map_err(|e| Error::Process(format!("Failed to wait for process: {}", e)))?;
            return Ok(Termination::Graceful);
        }

        tracing::warn!(pid = self.pid, grace_secs = grace.as_secs(), "Grace period expired, force killing");
        self.child
            .kill()
            .map_err(|e| Error::Process(format!("Failed to kill process: {}", e)))?;

        match timeout(kill_timeout, self.child.status()).await {
            Ok(status) => {
                status.map_err(|e| Error::Process(format!("Failed to reap process: {}", e)))?;
                Ok(Termination::Forced)
            }
            Err(_) => Err(Error::Process(format!(
                "Process {} not reaped within {}s of force kill",
                self.pid,
                kill_timeout.as_secs()
            ))),
        }
    }
}

/// Force-kill every process whose executable name contains `pattern`
/// (case-insensitive), plus `tracked_pid` if given. Returns the number of
/// processes killed.
///
/// This is the escape hatch for when the tracked handle has desynced from
/// reality: it sweeps the whole process table, not just the tracked pid, so
/// a too-broad pattern can take down unrelated processes. The tracked pid is
/// killed even when its name does not match the pattern, so a misconfigured
/// pattern cannot leave the supervised child behind.
pub fn kill_all(pattern: &str, tracked_pid: Option<u32>) -> usize {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);

    let needle = pattern.to_lowercase();
    let mut killed = 0;
    for (pid, process) in system.processes() {
        let name = process.name().to_string_lossy().to_lowercase();
        let tracked = tracked_pid == Some(pid.as_u32());
        if (name.contains(&needle) || tracked) && process.kill() {
            tracing::info!(pid = pid.as_u32(), name = %name, tracked, "Force killed process");
            killed += 1;
        }
    }
    killed
}
