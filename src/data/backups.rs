use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Metadata for one archive in the backups directory.
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    pub name: String,
    pub size_bytes: u64,
    pub created: String,
}

/// Creates and manages zip archives of the world directory.
///
/// Archives land in `<server_dir>/backups/` named
/// `world_backup_YYYYmmdd_HHMMSS.zip`, with entry paths relative to the
/// server directory so extracting one into a fresh server directory
/// restores the world in place.
pub struct BackupManager {
    server_dir: PathBuf,
    backups_dir: PathBuf,
}

impl BackupManager {
    pub fn new(server_dir: &Path) -> Self {
        Self {
            server_dir: server_dir.to_path_buf(),
            backups_dir: server_dir.join("backups"),
        }
    }

    /// Archive the world directory. Fails if there is no world yet.
    pub fn create(&self) -> Result<BackupInfo> {
        let world_dir = self.server_dir.join("world");
        if !world_dir.is_dir() {
            return Err(Error::Data("World directory does not exist".to_string()));
        }
        fs::create_dir_all(&self.backups_dir)?;

        let name = format!(
            "world_backup_{}.zip",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.backups_dir.join(&name);

        let file = File::create(&path)?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.add_dir(&mut zip, &world_dir, options)?;
        zip.finish()
            .map_err(|e| Error::Data(format!("Failed to finalize backup archive: {}", e)))?;

        let size_bytes = fs::metadata(&path)?.len();
        tracing::info!(name = %name, size_bytes, "World backup created");
        Ok(BackupInfo {
            name,
            size_bytes,
            created: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    fn add_dir(
        &self,
        zip: &mut ZipWriter<File>,
        dir: &Path,
        options: SimpleFileOptions,
    ) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                self.add_dir(zip, &path, options)?;
            } else {
                let arcname = path
                    .strip_prefix(&self.server_dir)
                    .map_err(|e| Error::Data(e.to_string()))?
                    .to_string_lossy()
                    .replace('\\', "/");
                zip.start_file(arcname, options)
                    .map_err(|e| Error::Data(format!("Failed to add backup entry: {}", e)))?;
                let mut src = File::open(&path)?;
                io::copy(&mut src, zip)?;
            }
        }
        Ok(())
    }

    /// List archives newest first.
    pub fn list(&self) -> Result<Vec<BackupInfo>> {
        let mut backups = Vec::new();
        if !self.backups_dir.is_dir() {
            return Ok(backups);
        }
        for entry in fs::read_dir(&self.backups_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "zip") {
                continue;
            }
            let meta = entry.metadata()?;
            let created: DateTime<Local> = meta
                .modified()
                .map(DateTime::from)
                .unwrap_or_else(|_| Local::now());
            backups.push(BackupInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: meta.len(),
                created: created.format("%Y-%m-%d %H:%M:%S").to_string(),
            });
        }
        backups.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(backups)
    }

    /// Delete one archive by name. Names with path components are rejected
    /// so a request cannot reach outside the backups directory.
    pub fn delete(&self, name: &str) -> Result<String> {
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(Error::Data(format!("Invalid backup name: {}", name)));
        }
        let path = self.backups_dir.join(name);
        if !path.is_file() {
            return Err(Error::Data(format!("Backup {} does not exist", name)));
        }
        fs::remove_file(&path)?;
        Ok(format!("Backup {} deleted", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_requires_world_dir() {
        let dir = tempfile::tempdir().unwrap();
        let backups = BackupManager::new(dir.path());
        assert!(backups.create().is_err());
        assert!(backups.list().unwrap().is_empty());
    }

    #[test]
    fn test_backup_create_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("world/region")).unwrap();
        fs::write(dir.path().join("world/level.dat"), b"data").unwrap();
        fs::write(dir.path().join("world/region/r.0.0.mca"), b"chunk").unwrap();

        let backups = BackupManager::new(dir.path());
        let info = backups.create().unwrap();
        assert!(info.name.starts_with("world_backup_"));
        assert!(info.size_bytes > 0);

        let listed = backups.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, info.name);

        backups.delete(&info.name).unwrap();
        assert!(backups.list().unwrap().is_empty());
    }

    #[test]
    fn test_delete_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let backups = BackupManager::new(dir.path());
        assert!(backups.delete("../secrets.zip").is_err());
        assert!(backups.delete("nope.zip").is_err());
    }
}
