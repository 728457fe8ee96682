//! The store seam the pipeline depends on

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::null::NullStore;
use crate::rest::RestStore;

/// Options for [`KvStore::set`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Expire the key after this many seconds
    pub ttl_seconds: Option<u64>,
}

/// Key/value plus sorted-set operations.
///
/// Implementations are blocking. Per-key atomicity is assumed from the
/// backing service; nothing spans keys.
pub trait KvStore: Send + Sync {
    /// Cheap authenticated request. `Ok(false)` when the token is rejected.
    fn probe_auth(&self) -> Result<bool, StoreError>;

    /// Upsert a string value; returns the service's success flag.
    fn set(&self, key: &str, value: &str, opts: SetOptions) -> Result<bool, StoreError>;

    /// `None` when the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Upsert `(member, score)` pairs; returns how many members were added or re-scored.
    fn zadd(&self, key: &str, members: &[(&str, f64)]) -> Result<u64, StoreError>;

    /// Members by descending score, inclusive `start..=stop`; negative indices count from the end.
    fn zrevrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError>;

    /// Whether credentials exist at all.
    fn is_configured(&self) -> bool {
        true
    }

    /// Short description for logs (never includes tokens).
    fn describe(&self) -> String;
}

/// Store handle shared between the CLI, server handlers and pipeline runs.
pub type SharedStore = Arc<dyn KvStore>;

/// Pick the store implementation once at startup.
pub fn open_store(config: Option<StoreConfig>) -> SharedStore {
    match config {
        Some(config) => {
            log::debug!("Using REST store at {}", config.url);
            Arc::new(RestStore::new(config))
        }
        None => {
            log::info!("No store credentials configured, persistence disabled");
            Arc::new(NullStore)
        }
    }
}
