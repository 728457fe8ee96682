//! No-op store used when persistence is not configured

use crate::error::StoreError;
use crate::store::{KvStore, SetOptions};

const NOT_CONFIGURED: &str = "no store credentials configured";

/// Store that is never authenticated; every operation reports `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl KvStore for NullStore {
    fn probe_auth(&self) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn set(&self, _key: &str, _value: &str, _opts: SetOptions) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    fn zadd(&self, _key: &str, _members: &[(&str, f64)]) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    fn zrevrange(&self, _key: &str, _start: i64, _stop: i64) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    fn is_configured(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        "none".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_authenticated() {
        assert!(!NullStore.probe_auth().unwrap());
    }

    #[test]
    fn operations_unavailable() {
        assert!(NullStore.set("k", "v", SetOptions::default()).unwrap_err().is_unavailable());
        assert!(NullStore.get("k").unwrap_err().is_unavailable());
        assert!(NullStore.zadd("z", &[("m", 1.0)]).unwrap_err().is_unavailable());
        assert!(NullStore.zrevrange("z", 0, -1).unwrap_err().is_unavailable());
    }
}
