//! On-disk named caches of response snapshots.
//!
//! Layout: `{root}/{cache name}/{sha256(url)}.json` holds the entry metadata and
//! `{sha256(url)}.body` the raw body. Directories starting with `.` are staging
//! areas and never show up as caches.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracker_logging::{tracker_debug, tracker_warn};

use crate::persist::{ensure_data_dir, AtomicFileWriter, PersistError};
use crate::AssetResponse;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid cache name {0:?}")]
    InvalidName(String),
    #[error("corrupt cache entry {path}: {message}")]
    CorruptEntry { path: PathBuf, message: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    url: String,
    status: u16,
    content_type: Option<String>,
    response_url: String,
}

/// All caches under one root directory.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of existing caches, sorted.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if validate_name(&name).is_ok() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn has(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.root.join(name).is_dir()
    }

    /// Opens a cache, creating it when missing.
    pub fn open(&self, name: &str) -> Result<Cache, CacheError> {
        validate_name(name)?;
        let dir = self.root.join(name);
        ensure_data_dir(&dir)?;
        Ok(Cache::at(name, dir))
    }

    /// Deletes a cache and everything in it. Returns whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool, CacheError> {
        validate_name(name)?;
        match fs::remove_dir_all(self.root.join(name)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Stores every entry in cache `name`, or none of them.
    ///
    /// A cache that does not exist yet is built in a staging directory and
    /// renamed into place, so a failure leaves no partial cache behind.
    pub fn put_all(&self, name: &str, entries: &[(String, AssetResponse)]) -> Result<Cache, CacheError> {
        validate_name(name)?;
        let target = self.root.join(name);
        if target.is_dir() {
            let cache = Cache::at(name, target);
            for (url, response) in entries {
                cache.put(url, response)?;
            }
            return Ok(cache);
        }

        ensure_data_dir(&self.root)?;
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&self.root)?;
        let staged = Cache::at(name, staging.path().to_path_buf());
        for (url, response) in entries {
            staged.put(url, response)?;
        }
        fs::rename(staging.path(), &target)?;
        tracker_debug!("Created cache {} with {} entries", name, entries.len());
        Ok(Cache::at(name, target))
    }

    /// First match for `url` across all caches, in name order.
    pub fn match_any(&self, url: &str) -> Result<Option<AssetResponse>, CacheError> {
        for name in self.keys()? {
            let cache = Cache::at(&name, self.root.join(&name));
            if let Some(hit) = cache.match_url(url)? {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }
}

/// One named cache.
#[derive(Debug, Clone)]
pub struct Cache {
    name: String,
    writer: AtomicFileWriter,
}

impl Cache {
    fn at(name: &str, dir: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            writer: AtomicFileWriter::new(dir),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores a snapshot under `url`, replacing any previous one.
    ///
    /// The body is written before the metadata; an entry only counts once its
    /// metadata exists.
    pub fn put(&self, url: &str, response: &AssetResponse) -> Result<(), CacheError> {
        let stem = entry_stem(url);
        let meta = EntryMeta {
            url: url.to_string(),
            status: response.status,
            content_type: response.content_type.clone(),
            response_url: response.url.clone(),
        };
        let meta = serde_json::to_vec_pretty(&meta).map_err(|err| CacheError::CorruptEntry {
            path: self.writer.dir().join(format!("{stem}.json")),
            message: err.to_string(),
        })?;
        self.writer.write(&format!("{stem}.body"), &response.body)?;
        self.writer.write(&format!("{stem}.json"), meta)?;
        Ok(())
    }

    pub fn match_url(&self, url: &str) -> Result<Option<AssetResponse>, CacheError> {
        let stem = entry_stem(url);
        let meta_path = self.writer.dir().join(format!("{stem}.json"));
        let meta_text = match fs::read(&meta_path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let meta: EntryMeta =
            serde_json::from_slice(&meta_text).map_err(|err| CacheError::CorruptEntry {
                path: meta_path.clone(),
                message: err.to_string(),
            })?;
        if meta.url != url {
            tracker_warn!("Cache {} entry {:?} belongs to {}", self.name, meta_path, meta.url);
            return Ok(None);
        }
        let body_path = self.writer.dir().join(format!("{stem}.body"));
        let body = fs::read(&body_path).map_err(|err| CacheError::CorruptEntry {
            path: body_path,
            message: err.to_string(),
        })?;
        Ok(Some(AssetResponse {
            url: meta.response_url,
            status: meta.status,
            content_type: meta.content_type,
            body: Bytes::from(body),
        }))
    }

    /// Removes the entry for `url`. Returns whether one existed.
    pub fn delete(&self, url: &str) -> Result<bool, CacheError> {
        let stem = entry_stem(url);
        let existed = self.writer.remove(&format!("{stem}.json"))?;
        self.writer.remove(&format!("{stem}.body"))?;
        Ok(existed)
    }

    /// URLs of every stored entry, sorted.
    pub fn urls(&self) -> Result<Vec<String>, CacheError> {
        let mut urls = Vec::new();
        for entry in fs::read_dir(self.writer.dir())? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let text = fs::read(&path)?;
            let meta: EntryMeta =
                serde_json::from_slice(&text).map_err(|err| CacheError::CorruptEntry {
                    path: path.clone(),
                    message: err.to_string(),
                })?;
            urls.push(meta.url);
        }
        urls.sort();
        Ok(urls)
    }
}

fn validate_name(name: &str) -> Result<(), CacheError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidName(name.to_string()))
    }
}

fn entry_stem(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
