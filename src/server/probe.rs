use serde::Serialize;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// OS-level metrics for the supervised process, computed fresh per request.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    /// Whether the process exists in the OS process table
    pub running: bool,
    /// Tracked process id, if any
    pub pid: Option<u32>,
    /// CPU usage percentage (100 = one core)
    pub cpu_percent: f32,
    /// Resident set size in megabytes
    pub memory_mb: f64,
}

impl StatusSnapshot {
    /// The zeroed snapshot reported when no process is tracked or the
    /// process table no longer has it.
    pub fn stopped() -> Self {
        Self {
            running: false,
            pid: None,
            cpu_percent: 0.0,
            memory_mb: 0.0,
        }
    }
}

/// Probe the process table for `pid`.
///
/// Fails soft: an absent pid or a process that just exited yields the
/// zeroed snapshot, never an error. Status is best-effort by design.
///
/// CPU usage needs two samples, so this blocks for sysinfo's minimum CPU
/// update interval; call it from a blocking-friendly context.
pub fn probe(pid: Option<u32>) -> StatusSnapshot {
    let Some(pid) = pid else {
        return StatusSnapshot::stopped();
    };
    let target = Pid::from_u32(pid);
    let refresh = ProcessRefreshKind::nothing().with_cpu().with_memory();

    let mut system = System::new();
    system.refresh_processes_specifics(ProcessesToUpdate::Some(&[target]), true, refresh);
    if system.process(target).is_none() {
        return StatusSnapshot::stopped();
    }

    // Second sample after the minimum interval makes cpu_usage meaningful.
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    system.refresh_processes_specifics(ProcessesToUpdate::Some(&[target]), true, refresh);

    match system.process(target) {
        Some(process) => StatusSnapshot {
            running: true,
            pid: Some(pid),
            cpu_percent: process.cpu_usage(),
            memory_mb: process.memory() as f64 / 1024.0 / 1024.0,
        },
        None => StatusSnapshot::stopped(),
    }
}
