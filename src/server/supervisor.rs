use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::logs::{LogLevel, LogStore};
use crate::server::probe::{self, StatusSnapshot};
use crate::server::process::{self, GameProcess, Termination};
use crate::server::pump::OutputPump;
use serde::Serialize;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Lifecycle state of the managed server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerState {
    /// No process attached
    Stopped,
    /// Spawn in progress
    Starting,
    /// Process attached and believed alive
    Running,
    /// Graceful shutdown in progress
    Stopping,
}

/// Status report composed for the web layer.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// State-machine view of the server
    pub state: ServerState,
    /// Fresh OS-level metrics for the tracked pid
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
}

/// The process handle and pump, owned exclusively under the transition lock.
struct ProcessSlot {
    process: Option<GameProcess>,
    pump: Option<JoinHandle<()>>,
}

/// Externally visible view, readable without the transition lock.
struct SharedView {
    state: ServerState,
    pid: Option<u32>,
}

/// Orchestrates the server process lifecycle under a mutual-exclusion
/// discipline.
///
/// All state-transitioning operations (`start`, `stop`, `restart`,
/// `send_command`) serialize on one async lock for their full duration.
/// Read-only operations (`status`, log polling via [`LogStore`]) go through
/// a small separate mutex and never wait on a transition in flight.
/// `kill_all` deliberately bypasses the transition lock so it stays callable
/// while a hung `stop` waits out its grace period.
///
/// All public methods are instrumented with `tracing` spans.
pub struct Supervisor {
    /// Manager configuration
    config: ManagerConfig,
    /// Log store fed by the output pump
    logs: Arc<LogStore>,
    /// Transition lock owning the process handle
    slot: Mutex<ProcessSlot>,
    /// Lock-free-ish read path; never held across an await point
    shared: StdMutex<SharedView>,
}

impl Supervisor {
    /// Create a supervisor in the Stopped state.
    pub fn new(config: ManagerConfig, logs: Arc<LogStore>) -> Self {
        Self {
            config,
            logs,
            slot: Mutex::new(ProcessSlot {
                process: None,
                pump: None,
            }),
            shared: StdMutex::new(SharedView {
                state: ServerState::Stopped,
                pid: None,
            }),
        }
    }

    /// The log store this supervisor appends to.
    pub fn logs(&self) -> &Arc<LogStore> {
        &self.logs
    }

    /// Current state-machine view.
    pub fn state(&self) -> ServerState {
        self.shared.lock().unwrap().state
    }

    /// Tracked pid, if any.
    pub fn pid(&self) -> Option<u32> {
        self.shared.lock().unwrap().pid
    }

    fn set_state(&self, state: ServerState, pid: Option<u32>) {
        let mut shared = self.shared.lock().unwrap();
        shared.state = state;
        shared.pid = pid;
    }

    /// Reconcile a process that died out from under us (crash, external
    /// kill-all) back into Stopped before the next transition. Must run
    /// under the transition lock.
    async fn reconcile(&self, slot: &mut ProcessSlot) {
        let dead = match slot.process.as_mut() {
            Some(process) => !process.is_alive(),
            None => false,
        };
        if dead {
            slot.process = None;
            if let Some(pump) = slot.pump.take() {
                // The pipes are closed, so the pump ends on its own.
                let _ = pump.await;
            }
            self.set_state(ServerState::Stopped, None);
            self.logs
                .append(LogLevel::Error, "Server process exited unexpectedly");
            tracing::warn!("Reconciled dead server process to Stopped");
        }
    }

    /// Start the server.
    ///
    /// Fails with [`Error::AlreadyRunning`] unless the state machine is in
    /// `Stopped` (a dead leftover process is reconciled first). On spawn
    /// failure the state returns to `Stopped` and the error is surfaced.
    #[tracing::instrument(skip(self))]
    pub async fn start(&self) -> Result<u32> {
        let mut slot = self.slot.lock().await;
        self.reconcile(&mut slot).await;

        if self.state() != ServerState::Stopped {
            tracing::debug!("Start requested but server is not stopped");
            return Err(Error::AlreadyRunning);
        }

        // kill_all can force the state to Stopped while the slot still holds
        // a live child its sweep missed. Terminate it before spawning a
        // replacement; dropping the handle would leave it running untracked.
        if let Some(mut leftover) = slot.process.take() {
            tracing::warn!(pid = leftover.pid(), "Terminating leftover process before start");
            let _ = leftover
                .terminate(Duration::ZERO, self.config.kill_timeout())
                .await;
            if let Some(pump) = slot.pump.take() {
                let _ = pump.await;
            }
        }

        self.set_state(ServerState::Starting, None);
        self.logs.append(
            LogLevel::Info,
            format!("Starting server: {}", self.config.server.command),
        );

        let mut process = match GameProcess::spawn(&self.config.server, &self.config.server_dir) {
            Ok(process) => process,
            Err(e) => {
                self.set_state(ServerState::Stopped, None);
                self.logs
                    .append(LogLevel::Error, format!("Failed to start server: {}", e));
                return Err(e);
            }
        };
        let pid = process.pid();

        let (stdout, stderr) = match (process.take_stdout(), process.take_stderr()) {
            (Ok(stdout), Ok(stderr)) => (stdout, stderr),
            _ => {
                let _ = process
                    .terminate(Duration::ZERO, self.config.kill_timeout())
                    .await;
                self.set_state(ServerState::Stopped, None);
                return Err(Error::Process(
                    "Failed to take output pipes from server process".to_string(),
                ));
            }
        };

        slot.pump = Some(OutputPump::spawn(stdout, stderr, Arc::clone(&self.logs)));
        slot.process = Some(process);
        self.set_state(ServerState::Running, Some(pid));
        self.logs.append(
            LogLevel::Success,
            format!("Server process created, PID: {}", pid),
        );
        tracing::info!(pid = pid, "Server started");
        Ok(pid)
    }

    /// Stop the server.
    ///
    /// Blocks its caller for up to `grace` plus the force-kill reap timeout.
    /// Grace expiry escalates to a force kill (logged as a Warn line, not an
    /// error). Fails with [`Error::NotRunning`] unless the state machine is
    /// in `Running`. Tolerates the process disappearing mid-stop.
    #[tracing::instrument(skip(self))]
    pub async fn stop(&self, grace: Option<Duration>) -> Result<()> {
        let mut slot = self.slot.lock().await;
        self.reconcile(&mut slot).await;

        if self.state() != ServerState::Running {
            return Err(Error::NotRunning);
        }
        let Some(mut process) = slot.process.take() else {
            // State said Running but the handle is gone; nothing to stop.
            self.set_state(ServerState::Stopped, None);
            return Err(Error::NotRunning);
        };

        let grace = grace.unwrap_or_else(|| self.config.grace_period());
        self.set_state(ServerState::Stopping, Some(process.pid()));
        self.logs.append(LogLevel::Info, "Stopping server...");

        match process.terminate(grace, self.config.kill_timeout()).await {
            Ok(Termination::Graceful) => {
                self.logs.append(LogLevel::Success, "Server stopped");
            }
            Ok(Termination::Forced) => {
                self.logs.append(
                    LogLevel::Warn,
                    format!(
                        "Server did not exit within {}s grace period, force killed",
                        grace.as_secs()
                    ),
                );
            }
            Err(e) => {
                // A process already reaped out from under us (kill-all) is
                // still a completed stop as far as the state machine goes.
                self.logs
                    .append(LogLevel::Error, format!("Stop error: {}", e));
                tracing::warn!(error = %e, "Terminate failed during stop");
            }
        }

        if let Some(pump) = slot.pump.take() {
            let _ = pump.await;
        }
        self.set_state(ServerState::Stopped, None);
        tracing::info!("Server stopped");
        Ok(())
    }

    /// Restart the server: sequential stop then start. A stop that fails
    /// because the server was already stopped proceeds directly to start.
    #[tracing::instrument(skip(self))]
    pub async fn restart(&self, grace: Option<Duration>) -> Result<u32> {
        match self.stop(grace).await {
            Ok(()) | Err(Error::NotRunning) => {}
            Err(e) => return Err(e),
        }
        self.start().await
    }

    /// Write an operator command to the server's stdin and echo it into the
    /// log stream at Command level.
    ///
    /// Fails with [`Error::NotRunning`] unless the state machine is in
    /// `Running`.
    #[tracing::instrument(skip(self))]
    pub async fn send_command(&self, text: &str) -> Result<()> {
        let mut slot = self.slot.lock().await;
        self.reconcile(&mut slot).await;

        if self.state() != ServerState::Running {
            return Err(Error::NotRunning);
        }
        let Some(process) = slot.process.as_mut() else {
            return Err(Error::NotRunning);
        };

        self.logs.append(LogLevel::Command, text);
        if let Err(e) = process.write_line(text).await {
            self.logs
                .append(LogLevel::Error, format!("Failed to send command: {}", e));
            return Err(e);
        }
        tracing::debug!(command = %text, "Command sent to server");
        Ok(())
    }

    /// Force-kill every process matching the configured executable pattern,
    /// plus the tracked pid itself, and reset the state machine to Stopped.
    ///
    /// Bypasses the transition lock on purpose: this is the escape hatch
    /// for a supervisor whose tracked handle has desynced from reality, so
    /// it must work even while a hung `stop` holds the lock. Any in-flight
    /// stop finds its process already reaped and completes normally.
    #[tracing::instrument(skip(self))]
    pub async fn kill_all(&self) -> usize {
        let pattern = self.config.process_pattern.clone();
        let tracked = self.pid();
        let killed = tokio::task::spawn_blocking(move || process::kill_all(&pattern, tracked))
            .await
            .unwrap_or(0);

        self.logs.append(
            LogLevel::Warn,
            format!(
                "Force killed {} process(es) matching '{}'",
                killed, self.config.process_pattern
            ),
        );
        self.set_state(ServerState::Stopped, None);
        tracing::info!(killed = killed, "Kill-all sweep finished");
        killed
    }

    /// Read-only status: state-machine view plus a fresh probe of the
    /// tracked pid. Never waits on the transition lock.
    ///
    /// A `Running` state whose process has vanished from the process table
    /// is reconciled to `Stopped` here, so the machine cannot stay stuck on
    /// a dead process.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self) -> StatusReport {
        let (state, pid) = {
            let shared = self.shared.lock().unwrap();
            (shared.state, shared.pid)
        };

        let snapshot = tokio::task::spawn_blocking(move || probe::probe(pid))
            .await
            .unwrap_or_else(|_| StatusSnapshot::stopped());

        let state = if state == ServerState::Running && !snapshot.running {
            self.set_state(ServerState::Stopped, None);
            tracing::warn!("Tracked process gone from process table, reporting Stopped");
            ServerState::Stopped
        } else {
            state
        };

        StatusReport { state, snapshot }
    }
}
