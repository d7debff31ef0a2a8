use std::{fs, path::PathBuf};

/// Lifecycle hooks of the data/storage subsystem.
pub trait DataStorage: Send + Sync {
    fn init(&self) -> Result<(), String>;
    fn clear(&self) -> Result<(), String>;
}

/// Scratch directory that lives for one process run: created on `init`,
/// removed on `clear`.
#[derive(Debug, Clone)]
pub struct SessionDataStorage {
    dir: PathBuf,
}

impl SessionDataStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl DataStorage for SessionDataStorage {
    fn init(&self) -> Result<(), String> {
        fs::create_dir_all(&self.dir).map_err(|error| {
            format!(
                "Failed to create session data directory {}: {}",
                self.dir.display(),
                error
            )
        })
    }

    fn clear(&self) -> Result<(), String> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(format!(
                "Failed to remove session data directory {}: {}",
                self.dir.display(),
                error
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_storage_creates_and_removes_directory() {
        let root = tempfile::tempdir().expect("create temp dir");
        let dir = root.path().join("data").join("session");
        let storage = SessionDataStorage::new(dir.clone());

        storage.init().expect("init storage");
        fs::write(dir.join("cache.bin"), b"payload").expect("write session file");
        assert!(dir.is_dir());

        storage.clear().expect("clear storage");
        assert!(!dir.exists());
    }

    #[test]
    fn clearing_missing_directory_is_ok() {
        let root = tempfile::tempdir().expect("create temp dir");
        let storage = SessionDataStorage::new(root.path().join("never-created"));
        assert!(storage.clear().is_ok());
    }
}
