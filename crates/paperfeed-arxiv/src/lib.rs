//! Paperfeed arXiv - arXiv export API source
//!
//! Builds search queries, pages through the Atom feed lazily and
//! normalizes each entry into an [`Article`].
//!
//! # Example
//!
//! ```ignore
//! use paperfeed_arxiv::{ArxivClient, ClientConfig, Search, normalize};
//!
//! let client = ArxivClient::new(ClientConfig::default());
//! let search = Search::new("climate").max_results(10);
//! for raw in client.results(&search) {
//!     let article = normalize(&raw?)?;
//!     println!("{} ({})", article.title, article.published);
//! }
//! ```

pub mod client;
pub mod error;
pub mod parser;
pub mod query;
pub mod transform;

// Re-exports
pub use client::{ArxivClient, ClientConfig, PaperSource, Results};
pub use error::{NormalizeError, SourceError};
pub use parser::{FeedPage, Link, RawResult, parse_feed};
pub use query::{DateRange, Search, SortCriterion, SortOrder};
pub use transform::{Article, normalize};
