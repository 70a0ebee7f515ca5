use crate::data::properties::PropertiesStore;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

/// Default permission level granted to a new operator.
pub const DEFAULT_OP_LEVEL: u8 = 4;

/// Entry in `whitelist.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub uuid: Uuid,
    pub name: String,
}

/// Entry in `ops.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpEntry {
    pub uuid: Uuid,
    pub name: String,
    pub level: u8,
}

/// Entry in `banned-players.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannedPlayerEntry {
    pub uuid: Uuid,
    pub name: String,
    pub created: String,
    pub source: String,
    pub expires: String,
    pub reason: String,
}

/// Entry in `banned-ips.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannedIpEntry {
    pub ip: String,
    pub created: String,
    pub source: String,
    pub expires: String,
    pub reason: String,
}

struct JsonList<T> {
    path: PathBuf,
    entries: Mutex<Vec<T>>,
}

impl<T: Serialize + for<'de> Deserialize<'de>> JsonList<T> {
    fn load(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            // A corrupt file falls back to empty rather than wedging the
            // whole manager, matching vanilla server behavior.
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Unparseable list file, starting empty");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn save(&self, entries: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

fn ban_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S %z").to_string()
}

fn default_reason(reason: Option<&str>) -> String {
    match reason {
        Some(r) if !r.trim().is_empty() => r.to_string(),
        _ => "Banned by an operator".to_string(),
    }
}

/// The four player-list files the game server reads from its directory:
/// whitelist, operators, banned players, and banned IPs.
///
/// Names are compared case-insensitively, matching how the game treats
/// them. New player entries get the nil UUID; the server resolves real
/// UUIDs itself when it reloads the lists. Every mutation rewrites the
/// backing file, and "already present" / "not found" outcomes surface as
/// [`Error::Data`] so the web layer can relay them verbatim.
pub struct RosterStore {
    whitelist: JsonList<PlayerEntry>,
    ops: JsonList<OpEntry>,
    banned_players: JsonList<BannedPlayerEntry>,
    banned_ips: JsonList<BannedIpEntry>,
}

impl RosterStore {
    /// Load all four lists from `server_dir`, tolerating missing or
    /// corrupt files.
    pub fn load(server_dir: &Path) -> Self {
        Self {
            whitelist: JsonList::load(server_dir.join("whitelist.json")),
            ops: JsonList::load(server_dir.join("ops.json")),
            banned_players: JsonList::load(server_dir.join("banned-players.json")),
            banned_ips: JsonList::load(server_dir.join("banned-ips.json")),
        }
    }

    pub fn whitelist(&self) -> Vec<PlayerEntry> {
        self.whitelist.entries.lock().unwrap().clone()
    }

    pub fn ops(&self) -> Vec<OpEntry> {
        self.ops.entries.lock().unwrap().clone()
    }

    pub fn banned_players(&self) -> Vec<BannedPlayerEntry> {
        self.banned_players.entries.lock().unwrap().clone()
    }

    pub fn banned_ips(&self) -> Vec<BannedIpEntry> {
        self.banned_ips.entries.lock().unwrap().clone()
    }

    /// Add a player to the whitelist. Also flips `white-list=true` in the
    /// server properties so the list takes effect on the next restart.
    pub fn add_whitelist(&self, name: &str, properties: &PropertiesStore) -> Result<String> {
        let mut entries = self.whitelist.entries.lock().unwrap();
        if entries.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
            return Err(Error::Data(format!("Player {} is already whitelisted", name)));
        }
        entries.push(PlayerEntry {
            uuid: Uuid::nil(),
            name: name.to_string(),
        });
        self.whitelist.save(&entries)?;
        properties.set("white-list", "true")?;
        Ok(format!("{} added to the whitelist", name))
    }

    /// Remove a player from the whitelist.
    pub fn remove_whitelist(&self, name: &str) -> Result<String> {
        let mut entries = self.whitelist.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|p| !p.name.eq_ignore_ascii_case(name));
        if entries.len() == before {
            return Err(Error::Data(format!("Player {} is not whitelisted", name)));
        }
        self.whitelist.save(&entries)?;
        Ok(format!("{} removed from the whitelist", name))
    }

    /// Grant operator status at the given permission level.
    pub fn add_op(&self, name: &str, level: Option<u8>) -> Result<String> {
        let level = level.unwrap_or(DEFAULT_OP_LEVEL);
        let mut entries = self.ops.entries.lock().unwrap();
        if entries.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
            return Err(Error::Data(format!("Player {} is already an operator", name)));
        }
        entries.push(OpEntry {
            uuid: Uuid::nil(),
            name: name.to_string(),
            level,
        });
        self.ops.save(&entries)?;
        Ok(format!("{} is now an operator (level {})", name, level))
    }

    /// Revoke operator status.
    pub fn remove_op(&self, name: &str) -> Result<String> {
        let mut entries = self.ops.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|p| !p.name.eq_ignore_ascii_case(name));
        if entries.len() == before {
            return Err(Error::Data(format!("Player {} is not an operator", name)));
        }
        self.ops.save(&entries)?;
        Ok(format!("{} is no longer an operator", name))
    }

    /// Ban a player permanently. An empty reason gets the game's stock one.
    pub fn ban_player(&self, name: &str, reason: Option<&str>) -> Result<String> {
        let mut entries = self.banned_players.entries.lock().unwrap();
        if entries.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
            return Err(Error::Data(format!("Player {} is already banned", name)));
        }
        entries.push(BannedPlayerEntry {
            uuid: Uuid::nil(),
            name: name.to_string(),
            created: ban_timestamp(),
            source: "Server".to_string(),
            expires: "forever".to_string(),
            reason: default_reason(reason),
        });
        self.banned_players.save(&entries)?;
        Ok(format!("{} has been banned", name))
    }

    /// Lift a player ban.
    pub fn unban_player(&self, name: &str) -> Result<String> {
        let mut entries = self.banned_players.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|p| !p.name.eq_ignore_ascii_case(name));
        if entries.len() == before {
            return Err(Error::Data(format!("Player {} is not banned", name)));
        }
        self.banned_players.save(&entries)?;
        Ok(format!("{} has been unbanned", name))
    }

    /// Ban an IP address permanently. IPs compare exactly, not
    /// case-insensitively.
    pub fn ban_ip(&self, ip: &str, reason: Option<&str>) -> Result<String> {
        let mut entries = self.banned_ips.entries.lock().unwrap();
        if entries.iter().any(|e| e.ip == ip) {
            return Err(Error::Data(format!("IP {} is already banned", ip)));
        }
        entries.push(BannedIpEntry {
            ip: ip.to_string(),
            created: ban_timestamp(),
            source: "Server".to_string(),
            expires: "forever".to_string(),
            reason: default_reason(reason),
        });
        self.banned_ips.save(&entries)?;
        Ok(format!("IP {} has been banned", ip))
    }

    /// Lift an IP ban.
    pub fn unban_ip(&self, ip: &str) -> Result<String> {
        let mut entries = self.banned_ips.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e.ip != ip);
        if entries.len() == before {
            return Err(Error::Data(format!("IP {} is not banned", ip)));
        }
        self.banned_ips.save(&entries)?;
        Ok(format!("IP {} has been unbanned", ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist_add_is_case_insensitive_on_dupes() {
        let dir = tempfile::tempdir().unwrap();
        let roster = RosterStore::load(dir.path());
        let props = PropertiesStore::load(dir.path()).unwrap();

        roster.add_whitelist("Steve", &props).unwrap();
        assert!(roster.add_whitelist("steve", &props).is_err());
        assert_eq!(roster.whitelist().len(), 1);
        assert_eq!(roster.whitelist()[0].uuid, Uuid::nil());
        assert_eq!(props.get("white-list").as_deref(), Some("true"));
    }

    #[test]
    fn test_remove_missing_op_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let roster = RosterStore::load(dir.path());
        assert!(roster.remove_op("Alex").is_err());

        roster.add_op("Alex", None).unwrap();
        assert_eq!(roster.ops()[0].level, DEFAULT_OP_LEVEL);
        roster.remove_op("ALEX").unwrap();
        assert!(roster.ops().is_empty());
    }

    #[test]
    fn test_ban_defaults_reason_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        {
            let roster = RosterStore::load(dir.path());
            roster.ban_player("Griefer", Some("  ")).unwrap();
            roster.ban_ip("10.0.0.9", Some("spam")).unwrap();
        }

        let reloaded = RosterStore::load(dir.path());
        let banned = reloaded.banned_players();
        assert_eq!(banned[0].reason, "Banned by an operator");
        assert_eq!(banned[0].expires, "forever");
        assert_eq!(reloaded.banned_ips()[0].reason, "spam");
    }

    #[test]
    fn test_corrupt_list_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ops.json"), "{not json").unwrap();
        let roster = RosterStore::load(dir.path());
        assert!(roster.ops().is_empty());
    }
}
