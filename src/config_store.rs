use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde_json::{Map, Value};

/// Process-wide persisted key-value store.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value) -> Result<(), String>;
}

/// JSON object on disk, re-written on every `set`. Keys this process never
/// touches are preserved.
#[derive(Debug)]
pub struct JsonFileConfigStore {
    path: PathBuf,
    state: Mutex<Map<String, Value>>,
}

impl JsonFileConfigStore {
    pub fn open<F>(path: PathBuf, log: F) -> Self
    where
        F: Fn(&str),
    {
        let state = load_state_object(&path, &log);
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_state(&self, state: &Map<String, Value>) -> Result<(), String> {
        if let Some(parent_dir) = self.path.parent() {
            fs::create_dir_all(parent_dir).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent_dir.display(),
                    error
                )
            })?;
        }

        let serialized = serde_json::to_string_pretty(state)
            .map_err(|error| format!("Failed to serialize desktop state: {error}"))?;
        fs::write(&self.path, serialized).map_err(|error| {
            format!(
                "Failed to write desktop state {}: {}",
                self.path.display(),
                error
            )
        })
    }
}

fn load_state_object<F>(path: &Path, log: F) -> Map<String, Value>
where
    F: Fn(&str),
{
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Map::new(),
        Err(error) => {
            log(&format!(
                "failed to read desktop state {}: {}. starting with empty state",
                path.display(),
                error
            ));
            return Map::new();
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            log(&format!(
                "desktop state {} has non-object root; resetting state",
                path.display()
            ));
            Map::new()
        }
        Err(error) => {
            log(&format!(
                "failed to parse desktop state {}: {}. resetting state",
                path.display(),
                error
            ));
            Map::new()
        }
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn get(&self, key: &str) -> Option<Value> {
        let guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), String> {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.insert(key.to_string(), value);
        self.write_state(&guard)
    }
}

/// Keeps nothing on disk. Used when no root directory can be resolved.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    state: Mutex<Map<String, Value>>,
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<Value> {
        let guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), String> {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.insert(key.to_string(), value);
        Ok(())
    }
}
