use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

pub const POOL_KEY: &str = "horse-lottery-pool-v3";
pub const RECORDS_KEY: &str = "horse-lottery-records-v3";
pub const HOST_PIN_KEY: &str = "horse-lottery-host-pin-v1";
pub const HOST_UNLOCKED_KEY: &str = "horse-lottery-host-unlocked-v1";
pub const MARKERS_KEY: &str = "my_travel_map_markers_v2";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not access storage entry {key}: {source}")]
    Io {
        key: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// String key-value store holding the persisted state of the toolbox.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Volatile storage, used for session scoped state and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Keeps every key in its own `<key>.json` file under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    #[instrument(skip(self, value), fields(root = %self.root.display()))]
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io {
            key: key.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.root).map_err(io_err)?;
        std::fs::write(self.path_for(key), value).map_err(io_err)?;
        debug!(bytes = value.len(), "storage entry written");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Read a JSON value. Empty entries read as absent, and so do entries that
/// fail to parse: stored state is never trusted to be well formed.
pub fn read_json<S: Storage + ?Sized>(storage: &S, key: &str) -> Result<Option<Value>, StorageError> {
    let raw = match storage.get(key)? {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(None),
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "ignoring unparsable storage entry");
            Ok(None)
        }
    }
}

pub fn write_json<S: Storage + ?Sized, T: Serialize + ?Sized>(
    storage: &mut S,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let encoded = serde_json::to_string(value)?;
    storage.set(key, &encoded)
}
