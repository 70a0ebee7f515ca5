/*!
 # MC Manager

 A Rust service for supervising a Minecraft (Fabric) game server, with a
 polling web API for a browser frontend.

 ## Overview

 MC Manager provides functionality to:
 - Start, stop, and restart the game server process
 - Capture and reformat the server's console output into a bounded,
   pollable log stream mirrored to disk
 - Probe the live process for CPU and memory usage
 - Inject operator commands over the server's stdin
 - Edit `server.properties` and the whitelist, ops, and ban lists
 - Archive and manage world backups and installed mods

 ## Basic Usage

 ```no_run
 use mc_manager::config::ManagerConfig;
 use mc_manager::logs::LogStore;
 use mc_manager::server::Supervisor;
 use mc_manager::Result;
 use std::sync::Arc;

 #[tokio::main]
 async fn main() -> Result<()> {
     let config = ManagerConfig::from_file("manager.json")?;

     let logs = Arc::new(LogStore::with_mirror(
         config.log_capacity,
         &config.server_dir,
     ));
     let supervisor = Supervisor::new(config, logs);

     let pid = supervisor.start().await?;
     println!("Server running with PID {}", pid);

     supervisor.send_command("say Hello from the manager").await?;
     supervisor.stop(None).await?;
     Ok(())
 }
 ```

 ## Features

 - **Process Supervision**: One long-running child process with a strict
   lifecycle state machine and graceful-then-forced shutdown
 - **Log Capture**: A pump task drains stdout and stderr into a capped
   in-memory buffer with fingerprint-based delta polling
 - **Data Management**: CRUD over the server's own data files, kept in
   the exact formats the game rereads
 - **Web API**: Actix Web JSON endpoints under `/api` for a polling client
 - **Error Handling**: Comprehensive error handling
 - **Async Support**: Full async/await support
*/

pub mod config;
pub mod data;
pub mod error;
pub mod logs;
pub mod server;
pub mod web;

pub use error::{Error, Result};
pub use server::{ServerState, StatusReport, Supervisor};
