//! # Persistent Key-Value Store
//!
//! Named slots holding JSON values. The app reads each list once at startup
//! and writes the whole list back after every mutation.
//!
//! ```text
//! <data_dir>/
//! ├── snippets.json    # [{id, title, language, code, createdAt}, ...]
//! └── reminders.json   # [{id, text, createdAt}, ...]
//! ```
//!
//! All writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub trait KeyValueStore {
    /// Returns the value in slot `key`, or `None` if the slot was never written.
    fn read(&self, key: &str) -> io::Result<Option<Value>>;

    /// Replaces the value in slot `key`.
    fn write(&self, key: &str, value: &Value) -> io::Result<()>;
}

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid store key: {key:?}"),
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

impl KeyValueStore for JsonDirStore {
    fn read(&self, key: &str) -> io::Result<Option<Value>> {
        let path = self.slot_path(key)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let value = serde_json::from_str(&contents)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        debug!("Read slot {} from {}", key, path.display());
        Ok(Some(value))
    }

    fn write(&self, key: &str, value: &Value) -> io::Result<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir)?;
        atomic_write_json(&path, value)?;
        debug!("Wrote slot {} to {}", key, path.display());
        Ok(())
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Value>>,
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> io::Result<Option<Value>> {
        let slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &Value) -> io::Result<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Loads a list from slot `key`. A missing, unreadable or malformed slot
/// yields an empty list.
pub fn load_list<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let value = match store.read(key) {
        Ok(Some(value)) => value,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read {}: {}", key, e);
            return Vec::new();
        }
    };
    match serde_json::from_value(value) {
        Ok(list) => list,
        Err(e) => {
            warn!("Ignoring malformed {} list: {}", key, e);
            Vec::new()
        }
    }
}

/// Writes the full list to slot `key`.
pub fn save_list<T: Serialize>(store: &dyn KeyValueStore, key: &str, items: &[T]) -> io::Result<()> {
    let value =
        serde_json::to_value(items).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    store.write(key, &value)
}
