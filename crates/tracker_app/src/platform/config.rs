//! `tracker.ron` loading. Every field is optional; command line flags win.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracker_engine::{CachePolicy, FetchSettings, Url, WorkerSettings, DEFAULT_CACHE_VERSION};

pub const DEFAULT_CONFIG_FILE: &str = "tracker.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Also log to this file when set.
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    pub offline: OfflineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("tracker-data"),
            log_file: None,
            log_level: "warn".to_string(),
            offline: OfflineConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineConfig {
    pub base_url: String,
    /// Defaults to `<data_dir>/caches`.
    pub cache_root: Option<PathBuf>,
    pub cache_version: String,
    /// `CacheFirst` or `NetworkFirst`.
    pub policy: CachePolicy,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_bytes: u64,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            base_url: "http://localhost:8080/".to_string(),
            cache_root: None,
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            policy: CachePolicy::default(),
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_bytes: fetch.max_bytes,
        }
    }
}

impl AppConfig {
    /// Reads `path`, or `tracker.ron` when no path is given.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, log_level: Option<String>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(level) = log_level {
            self.log_level = level;
        }
        self
    }

    pub fn cache_root(&self) -> PathBuf {
        self.offline
            .cache_root
            .clone()
            .unwrap_or_else(|| self.data_dir.join("caches"))
    }
}

impl OfflineConfig {
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_bytes,
            ..FetchSettings::default()
        }
    }

    pub fn worker_settings(&self) -> Result<WorkerSettings> {
        let mut base = self.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).with_context(|| format!("invalid base_url {:?}", self.base_url))?;
        let mut settings = WorkerSettings::new(base_url);
        settings.cache_version = self.cache_version.clone();
        settings.policy = self.policy;
        Ok(settings)
    }
}
