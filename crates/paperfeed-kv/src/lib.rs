//! Paperfeed KV - Minimal REST key/value and sorted-set client
//!
//! Talks to an Upstash / Vercel KV style endpoint: every command is a JSON
//! array POSTed with a bearer token, every reply a `{"result": ...}` envelope.
//! [`NullStore`] stands in when no credentials are configured.

pub mod command;
pub mod config;
pub mod error;
pub mod null;
pub mod reply;
pub mod rest;
pub mod store;

// Re-exports
pub use config::StoreConfig;
pub use error::StoreError;
pub use null::NullStore;
pub use rest::RestStore;
pub use store::{KvStore, SetOptions, SharedStore, open_store};
