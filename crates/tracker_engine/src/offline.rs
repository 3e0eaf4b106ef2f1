//! Offline cache worker: precache on install, drop stale caches on activate,
//! then answer GET requests from cache or network according to one policy.

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};
use url::Url;

use crate::cache::{CacheError, CacheStorage};
use crate::fetch::Fetcher;
use crate::store::{JsonStore, StoreError};
use crate::{AssetRequest, AssetResponse, FailureKind, FetchError};

/// Assets fetched and stored at install time, relative to the base URL.
pub const PRECACHE_ASSETS: &[&str] = &[
    "./",
    "./index.html",
    "./style.css",
    "./app.js",
    "./manifest.json",
];

pub const DEFAULT_CACHE_VERSION: &str = "spending-tracker-cache-v1";

const REGISTRATION_KEY: &str = "registration";

/// How intercepted GET requests are answered. A worker uses exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    /// Cached copy if present, else network. Network results are not stored.
    #[default]
    #[serde(alias = "CacheFirst")]
    CacheFirst,
    /// Network first, storing successful responses; cached copy when the network fails.
    #[serde(alias = "NetworkFirst")]
    NetworkFirst,
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachePolicy::CacheFirst => write!(f, "cache-first"),
            CachePolicy::NetworkFirst => write!(f, "network-first"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerState {
    Installing,
    /// Precache done; waiting for activation.
    Installed,
    /// Stale caches removed; requests are intercepted.
    Activated,
    /// Install failed; this version will never serve.
    Redundant,
}

#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub base_url: Url,
    pub cache_version: String,
    pub assets: Vec<String>,
    pub policy: CachePolicy,
}

impl WorkerSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            assets: PRECACHE_ASSETS.iter().map(|s| s.to_string()).collect(),
            policy: CachePolicy::default(),
        }
    }

    /// Absolute URL for an asset path or request path.
    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, format!("{path}: {err}")))
    }
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("precache of {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("precache of {url} returned status {status}")]
    BadStatus { url: String, status: u16 },
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker is {0:?}, not activated")]
    NotActive(WorkerState),
    #[error("worker is {0:?}; activate needs a completed install")]
    NotInstalled(WorkerState),
    #[error(transparent)]
    Install(#[from] InstallError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Registration(#[from] StoreError),
    #[error("{url} is not cached and the network failed: {source}")]
    Offline {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Cache,
    Network,
    /// Not intercepted (non-GET); went to the network untouched.
    Passthrough,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub from: ServedFrom,
    pub response: AssetResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Registration {
    cache_version: String,
    state: WorkerState,
    /// Activated version that keeps serving until this one activates.
    #[serde(default)]
    previous: Option<String>,
}

pub struct OfflineWorker {
    settings: WorkerSettings,
    fetcher: Arc<dyn Fetcher>,
    storage: CacheStorage,
    registry: JsonStore,
    state: WorkerState,
    previous: Option<String>,
}

impl OfflineWorker {
    /// Creates a worker, picking up the lifecycle state recorded for this cache version.
    ///
    /// A new cache version starts over at `Installing`. If the recorded version
    /// was activated, requests keep being answered on its behalf until the new
    /// version activates.
    pub fn new(settings: WorkerSettings, fetcher: Arc<dyn Fetcher>, storage: CacheStorage) -> Self {
        let registry = JsonStore::new(storage.root().to_path_buf());
        let recorded: Option<Registration> = registry.load(REGISTRATION_KEY, None);
        let (state, previous) = match recorded {
            Some(reg) if reg.cache_version == settings.cache_version => (reg.state, reg.previous),
            Some(reg) => {
                tracker_info!(
                    "Cache version changed from {} to {}; reinstall needed",
                    reg.cache_version,
                    settings.cache_version
                );
                let previous = match reg.state {
                    WorkerState::Activated => Some(reg.cache_version),
                    _ => reg.previous,
                };
                (WorkerState::Installing, previous)
            }
            None => (WorkerState::Installing, None),
        };
        Self {
            settings,
            fetcher,
            storage,
            registry,
            state,
            previous,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// Cache version whose worker currently answers requests, if any.
    pub fn serving_version(&self) -> Option<&str> {
        if self.state == WorkerState::Activated {
            Some(&self.settings.cache_version)
        } else {
            self.previous.as_deref()
        }
    }

    /// Fetches every precache asset, then stores them all in the versioned cache.
    ///
    /// If any asset fails nothing is stored and the worker becomes redundant.
    pub async fn install(&mut self) -> Result<usize, WorkerError> {
        self.set_state(WorkerState::Installing)?;
        match self.precache().await {
            Ok(count) => {
                self.set_state(WorkerState::Installed)?;
                tracker_info!(
                    "Installed {} with {} assets",
                    self.settings.cache_version,
                    count
                );
                Ok(count)
            }
            Err(err) => {
                tracker_warn!("Install of {} failed: {}", self.settings.cache_version, err);
                self.set_state(WorkerState::Redundant)?;
                Err(err.into())
            }
        }
    }

    async fn precache(&self) -> Result<usize, InstallError> {
        let mut entries = Vec::with_capacity(self.settings.assets.len());
        for asset in &self.settings.assets {
            let url = self
                .settings
                .resolve(asset)
                .map_err(|source| InstallError::Fetch {
                    url: asset.clone(),
                    source,
                })?;
            let response = self
                .fetcher
                .fetch(&AssetRequest::get(url.clone()))
                .await
                .map_err(|source| InstallError::Fetch {
                    url: url.to_string(),
                    source,
                })?;
            if !response.is_ok() {
                return Err(InstallError::BadStatus {
                    url: url.to_string(),
                    status: response.status,
                });
            }
            entries.push((url.to_string(), response));
        }
        self.storage.put_all(&self.settings.cache_version, &entries)?;
        Ok(entries.len())
    }

    /// Deletes every cache not named after the current version. Returns the deleted names.
    pub fn activate(&mut self) -> Result<Vec<String>, WorkerError> {
        match self.state {
            WorkerState::Installed | WorkerState::Activated => {}
            other => return Err(WorkerError::NotInstalled(other)),
        }
        let mut deleted = Vec::new();
        for name in self.storage.keys()? {
            if name != self.settings.cache_version && self.storage.delete(&name)? {
                tracker_info!("Deleted stale cache {}", name);
                deleted.push(name);
            }
        }
        self.previous = None;
        self.set_state(WorkerState::Activated)?;
        Ok(deleted)
    }

    /// Answers a request the page made.
    pub async fn handle_fetch(&self, request: &AssetRequest) -> Result<Served, WorkerError> {
        let Some(serving) = self.serving_version() else {
            return Err(WorkerError::NotActive(self.state));
        };
        if request.method != Method::GET {
            let response = self.fetcher.fetch(request).await?;
            return Ok(Served {
                from: ServedFrom::Passthrough,
                response,
            });
        }
        match self.settings.policy {
            CachePolicy::CacheFirst => self.cache_first(request).await,
            CachePolicy::NetworkFirst => self.network_first(request, serving).await,
        }
    }

    async fn cache_first(&self, request: &AssetRequest) -> Result<Served, WorkerError> {
        if let Some(response) = self.storage.match_any(request.url.as_str())? {
            tracker_debug!("Cache hit for {}", request.url);
            return Ok(Served {
                from: ServedFrom::Cache,
                response,
            });
        }
        let response = self.fetcher.fetch(request).await?;
        Ok(Served {
            from: ServedFrom::Network,
            response,
        })
    }

    async fn network_first(
        &self,
        request: &AssetRequest,
        serving: &str,
    ) -> Result<Served, WorkerError> {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    let cache = self.storage.open(serving)?;
                    if let Err(err) = cache.put(request.url.as_str(), &response) {
                        tracker_warn!("Failed to cache {}: {}", request.url, err);
                    }
                }
                Ok(Served {
                    from: ServedFrom::Network,
                    response,
                })
            }
            Err(source) => {
                tracker_debug!("Network failed for {}: {}", request.url, source);
                match self.storage.match_any(request.url.as_str())? {
                    Some(response) => Ok(Served {
                        from: ServedFrom::Cache,
                        response,
                    }),
                    None => Err(WorkerError::Offline {
                        url: request.url.to_string(),
                        source,
                    }),
                }
            }
        }
    }

    fn set_state(&mut self, state: WorkerState) -> Result<(), StoreError> {
        self.state = state;
        self.registry.save(
            REGISTRATION_KEY,
            &Registration {
                cache_version: self.settings.cache_version.clone(),
                state,
                previous: self.previous.clone(),
            },
        )
    }
}
