//! Key-value store holding one JSON document per key.
//!
//! Each key lives in `{data_dir}/{key}.json`. Saves overwrite unconditionally;
//! there is no merging and no history beyond the single file per key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracker_logging::{tracker_debug, tracker_warn};

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("failed to serialize value for {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    writer: AtomicFileWriter,
}

impl JsonStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(data_dir),
        }
    }

    pub fn data_dir(&self) -> &Path {
        self.writer.dir()
    }

    /// Raw stored text for `key`, if present.
    pub fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    /// Like [`JsonStore::read_raw`], but unreadable files count as absent (with a warning).
    pub fn load_raw(&self, key: &str) -> Option<String> {
        match self.read_raw(key) {
            Ok(raw) => raw,
            Err(err) => {
                tracker_warn!("Failed to read stored {}: {}", key, err);
                None
            }
        }
    }

    /// Parsed value for `key`, or `fallback` when missing or corrupt.
    pub fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let Some(raw) = self.load_raw(key) else {
            tracker_debug!("No stored value for {}, using fallback", key);
            return fallback;
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracker_warn!("Failed to parse stored {}, using fallback: {}", key, err);
                fallback
            }
        }
    }

    /// Serializes `value` and overwrites whatever `key` held before.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let filename = file_name(key)?;
        let content = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        let path = self.writer.write(&filename, content)?;
        tracker_debug!("Saved {} to {:?}", key, path);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Deletes `key`. Returns whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let filename = file_name(key)?;
        Ok(self.writer.remove(&filename)?)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        Ok(self.writer.dir().join(file_name(key)?))
    }
}

/// Keys become file names, so anything that could leave the data directory is refused.
fn file_name(key: &str) -> Result<String, StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(format!("{key}.json"))
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
