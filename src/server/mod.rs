//! Server process management.
//!
//! [`Supervisor`] owns the lifecycle state machine and is the only public
//! entry point for starting, stopping, and commanding the server process.
//! The submodules split the mechanics: [`process`] wraps the OS child,
//! [`pump`] drains its output into the log store, and [`probe`] reads
//! CPU and memory for the status endpoint.

pub mod probe;
pub mod process;
pub mod pump;
pub mod supervisor;

pub use probe::{probe, StatusSnapshot};
pub use process::{kill_all, GameProcess, Termination};
pub use pump::OutputPump;
pub use supervisor::{ServerState, StatusReport, Supervisor};
