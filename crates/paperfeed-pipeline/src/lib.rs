//! Paperfeed Pipeline - fetch, normalize, persist
//!
//! Pulls results from a [`PaperSource`](paperfeed_arxiv::PaperSource) in
//! source order, normalizes each one and upserts it into a
//! [`KvStore`](paperfeed_kv::KvStore): the article JSON under `paper:<id>`
//! and its publish time in a sorted-set index.

pub mod keys;
pub mod latest;
pub mod runner;

// Re-exports
pub use keys::{DEFAULT_INDEX_KEY, paper_key};
pub use latest::latest;
pub use runner::{Pipeline, Report, RunOptions, RunResult};
