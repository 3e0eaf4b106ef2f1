//! Tracker engine: local persistence, HTTP fetching and the offline asset cache.
mod cache;
mod engine;
mod fetch;
mod offline;
mod persist;
mod store;
mod types;

pub use cache::{Cache, CacheError, CacheStorage};
pub use engine::{RequestId, WorkerEvent, WorkerHandle};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use offline::{
    CachePolicy, InstallError, OfflineWorker, Served, ServedFrom, WorkerError, WorkerSettings,
    WorkerState, DEFAULT_CACHE_VERSION, PRECACHE_ASSETS,
};
pub use persist::{ensure_data_dir, AtomicFileWriter, PersistError};
pub use reqwest::Method;
pub use store::{JsonStore, StoreError};
pub use types::{AssetRequest, AssetResponse, FailureKind, FetchError};
pub use url::Url;
