use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-memory view of a `server.properties` file.
///
/// The file is a flat `key=value` list. Blank lines and `#` comments are
/// skipped on load and not preserved on save; insertion order of the
/// remaining keys is. All mutating operations write the file back
/// immediately.
pub struct PropertiesStore {
    path: PathBuf,
    entries: Mutex<Vec<(String, String)>>,
}

impl PropertiesStore {
    /// Load the properties file, or start empty if it does not exist.
    pub fn load(server_dir: &Path) -> Result<Self> {
        let path = server_dir.join("server.properties");
        let mut entries = Vec::new();
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    entries.push((key.trim().to_string(), value.trim().to_string()));
                }
            }
        }
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// All properties in file order.
    pub fn all(&self) -> Vec<(String, String)> {
        self.entries.lock().unwrap().clone()
    }

    /// Look up a single property.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Update an existing property. Unknown keys are rejected rather than
    /// created, so a typo in a client request cannot grow the file.
    pub fn update(&self, key: &str, value: &str) -> Result<String> {
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.iter_mut().find(|(k, _)| k == key) else {
            return Err(Error::Data(format!("Property '{}' does not exist", key)));
        };
        entry.1 = value.to_string();
        self.save(&entries)?;
        Ok(format!("Property '{}' updated to '{}'", key, value))
    }

    /// Set a property, creating it if missing. Used for flips the manager
    /// performs on its own, such as enabling `white-list`.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
        self.save(&entries)
    }

    fn save(&self, entries: &[(String, String)]) -> Result<()> {
        let mut out = String::new();
        for (key, value) in entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        fs::write(&self.path, out)?;
        Ok(())
    }
}
