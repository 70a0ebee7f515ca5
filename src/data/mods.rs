use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Lists and removes mod jars under `<server_dir>/mods/`.
pub struct ModCatalog {
    mods_dir: PathBuf,
}

impl ModCatalog {
    pub fn new(server_dir: &Path) -> Self {
        Self {
            mods_dir: server_dir.join("mods"),
        }
    }

    /// Names of all `.jar` files in the mods directory, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut mods = Vec::new();
        if !self.mods_dir.is_dir() {
            return Ok(mods);
        }
        for entry in fs::read_dir(&self.mods_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "jar") {
                mods.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        mods.sort();
        Ok(mods)
    }

    /// Delete one mod jar by name. Path components are rejected.
    pub fn remove(&self, name: &str) -> Result<String> {
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(Error::Data(format!("Invalid mod name: {}", name)));
        }
        let path = self.mods_dir.join(name);
        if !path.is_file() {
            return Err(Error::Data(format!("Mod {} does not exist", name)));
        }
        fs::remove_file(&path)?;
        Ok(format!("Mod {} removed", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_only_jars() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("mods")).unwrap();
        fs::write(dir.path().join("mods/fabric-api.jar"), b"").unwrap();
        fs::write(dir.path().join("mods/readme.txt"), b"").unwrap();

        let catalog = ModCatalog::new(dir.path());
        assert_eq!(catalog.list().unwrap(), vec!["fabric-api.jar"]);
    }

    #[test]
    fn test_remove_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ModCatalog::new(dir.path());
        assert!(catalog.remove("../server.jar").is_err());
    }
}
