//! Server-directory data files.
//!
//! Everything here mirrors state the game server itself reads:
//! `server.properties`, the four player-list JSON files, the mods
//! directory, and world backup archives. These stores assume they are
//! the only writer of their files while the manager runs; the game
//! server rereads them on restart or on a reload command.

pub mod backups;
pub mod mods;
pub mod properties;
pub mod roster;

pub use backups::{BackupInfo, BackupManager};
pub use mods::ModCatalog;
pub use properties::PropertiesStore;
pub use roster::{
    BannedIpEntry, BannedPlayerEntry, OpEntry, PlayerEntry, RosterStore, DEFAULT_OP_LEVEL,
};
