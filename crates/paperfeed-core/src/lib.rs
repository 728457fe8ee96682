//! Paperfeed Core - Shared plumbing for the paper feed
//!
//! Blocking HTTP on top of a pooled async client, logging setup,
//! and progress reporting used by the source, store and CLI crates.

pub mod http;
pub mod logging;
pub mod progress;

// Re-exports for convenience
pub use http::{HttpConfig, HttpError, Response, SHARED_RUNTIME, http_client, send, set_http_config};
pub use logging::init_logging;
pub use progress::{ProgressContext, SharedProgress, fmt_num};
