//! HTTP client for the REST key/value service

use paperfeed_core::{HttpError, Response, http_client};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use crate::command;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::reply::{ReplyError, decode};
use crate::store::{KvStore, SetOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

/// Store backed by an Upstash-compatible REST endpoint
#[derive(Debug, Clone)]
pub struct RestStore {
    config: StoreConfig,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// POST one command array
    fn send(&self, args: &[String], access: Access) -> Result<Response, HttpError> {
        let token = match access {
            Access::Read => self.config.read_token(),
            Access::Write => self.config.token.as_str(),
        };
        let body = serde_json::to_string(args).map_err(|e| HttpError::Transport {
            message: format!("cannot encode command: {e}"),
        })?;
        let request = http_client()
            .post(&self.config.url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        paperfeed_core::send(request)
    }

    fn read<T: DeserializeOwned>(&self, op: &'static str, args: Vec<String>) -> Result<T, StoreError> {
        let resp = self
            .send(&args, Access::Read)
            .map_err(|e| StoreError::read(op, e))?;
        decode(&resp).map_err(|e| StoreError::read(op, e))
    }

    fn write<T: DeserializeOwned>(&self, op: &'static str, args: Vec<String>) -> Result<T, StoreError> {
        let resp = self
            .send(&args, Access::Write)
            .map_err(|e| StoreError::write(op, e))?;
        decode(&resp).map_err(|e| StoreError::write(op, e))
    }
}

impl KvStore for RestStore {
    fn probe_auth(&self) -> Result<bool, StoreError> {
        let resp = self
            .send(&command::ping(), Access::Write)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        match decode::<String>(&resp) {
            Ok(_) => Ok(true),
            Err(ReplyError::Status { status: 401, .. }) => {
                log::warn!("Store at {} rejected the token (HTTP 401)", self.config.url);
                Ok(false)
            }
            Err(e) => {
                // Reachable and not an auth failure; let real operations surface errors.
                log::debug!("Store probe got unexpected reply: {e}");
                Ok(true)
            }
        }
    }

    fn set(&self, key: &str, value: &str, opts: SetOptions) -> Result<bool, StoreError> {
        let result: Option<String> = self.write("SET", command::set(key, value, &opts))?;
        Ok(result.as_deref() == Some("OK"))
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.read("GET", command::get(key))
    }

    fn zadd(&self, key: &str, members: &[(&str, f64)]) -> Result<u64, StoreError> {
        if members.is_empty() {
            return Ok(0);
        }
        self.write("ZADD", command::zadd(key, members))
    }

    fn zrevrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        self.read("ZREVRANGE", command::zrevrange(key, start, stop))
    }

    fn describe(&self) -> String {
        format!("REST store at {}", self.config.url)
    }
}
