//! One fetch-normalize-persist run

use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use paperfeed_arxiv::{Article, PaperSource, Search, SourceError, normalize};
use paperfeed_kv::{KvStore, SetOptions, StoreError};

use crate::keys::{DEFAULT_INDEX_KEY, paper_key};
use crate::latest::latest;

/// Which articles a run reports back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Report {
    /// Freshly normalized articles, in source order
    #[default]
    Fetched,
    /// Newest articles read back from the store; falls back to `Fetched`
    /// unless the read-back returned at least one article
    Stored,
}

impl Report {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fetched" => Some(Self::Fetched),
            "stored" => Some(Self::Stored),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Persist when the store is configured and authenticated
    pub store_enabled: bool,
    pub index_key: String,
    /// Read back this many newest articles after persisting
    pub read_back: Option<usize>,
    pub report: Report,
    pub ttl_seconds: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            store_enabled: true,
            index_key: DEFAULT_INDEX_KEY.to_string(),
            read_back: Some(10),
            report: Report::default(),
            ttl_seconds: None,
        }
    }
}

/// Outcome of one run
#[derive(Debug, Default)]
pub struct RunResult {
    /// Results received from the source, including ones that failed to normalize
    pub fetched_count: usize,
    /// Articles whose value and index entry were both written
    pub stored_count: usize,
    /// Results dropped as malformed
    pub skipped_count: usize,
    /// Whether persistence was active for this run
    pub persisted: bool,
    /// Articles visible in the store after the run, when read back
    pub visible_count: Option<usize>,
    pub articles: Vec<Article>,
    /// Set when the source failed; counts cover what arrived before it
    pub source_error: Option<SourceError>,
    pub elapsed: Duration,
}

impl RunResult {
    /// One-line summary for logs and HTTP replies
    pub fn message(&self) -> String {
        match (self.persisted, self.visible_count) {
            (true, Some(visible)) => format!(
                "Fetched {} papers, stored {}, and retrieved {visible} from the store",
                self.fetched_count, self.stored_count
            ),
            (true, None) => format!(
                "Fetched {} papers and stored {}",
                self.fetched_count, self.stored_count
            ),
            (false, _) => format!(
                "Fetched {} papers (store not available or not authenticated)",
                self.fetched_count
            ),
        }
    }
}

/// Fetch-normalize-persist orchestrator.
///
/// Holds no state between runs; the store is the only shared state.
pub struct Pipeline<'a> {
    source: &'a dyn PaperSource,
    store: &'a dyn KvStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(source: &'a dyn PaperSource, store: &'a dyn KvStore) -> Self {
        Self { source, store }
    }

    /// Store enabled, configured, and accepting our token.
    pub fn persistence_available(&self, opts: &RunOptions) -> bool {
        if !opts.store_enabled || !self.store.is_configured() {
            return false;
        }
        match self.store.probe_auth() {
            Ok(true) => true,
            Ok(false) => {
                log::warn!("{}: not authenticated, fetch-only mode", self.store.describe());
                false
            }
            Err(e) => {
                log::warn!("{e}; fetch-only mode");
                false
            }
        }
    }

    /// Run one search to completion.
    ///
    /// Per-item failures (malformed entries, rejected writes) are logged and
    /// skipped. A source failure stops the loop; whatever arrived before it
    /// is kept and the error is returned in [`RunResult::source_error`].
    pub fn run(&self, search: &Search, opts: &RunOptions, pb: &ProgressBar) -> RunResult {
        let start = Instant::now();
        let persist = self.persistence_available(opts);
        let mut result = RunResult {
            persisted: persist,
            ..Default::default()
        };

        log::info!(
            "{}: searching {:?} (max {})",
            self.source.name(),
            search.search_query(),
            search.max_results
        );
        pb.set_length(search.max_results as u64);

        let mut fetched = Vec::new();
        for item in self.source.search(search) {
            let raw = match item {
                Ok(raw) => raw,
                Err(e) => {
                    log::error!("{}: {e}", self.source.name());
                    result.source_error = Some(e);
                    break;
                }
            };
            result.fetched_count += 1;
            pb.inc(1);

            let article = match normalize(&raw) {
                Ok(article) => article,
                Err(e) => {
                    log::warn!("Skipping entry: {e}");
                    result.skipped_count += 1;
                    continue;
                }
            };
            pb.set_message(article.title.clone());

            if persist {
                match self.store_article(&article, opts) {
                    Ok(true) => {
                        result.stored_count += 1;
                        log::debug!("Stored paper: {}", article.id);
                    }
                    Ok(false) => log::warn!("Store did not acknowledge paper {}", article.id),
                    Err(e) => log::warn!("Error storing paper {}: {e}", article.id),
                }
            }
            fetched.push(article);
        }
        pb.finish_and_clear();

        let read_back = match (persist, opts.read_back) {
            (true, Some(count)) => match latest(self.store, &opts.index_key, count) {
                Ok(articles) => Some(articles),
                Err(e) => {
                    log::warn!("Error retrieving latest papers: {e}");
                    None
                }
            },
            _ => None,
        };
        result.visible_count = read_back.as_ref().map(Vec::len);
        result.articles = match (opts.report, read_back) {
            (Report::Stored, Some(stored)) if !stored.is_empty() => stored,
            _ => fetched,
        };
        result.elapsed = start.elapsed();

        log::info!("{} in {:.1}s", result.message(), result.elapsed.as_secs_f64());
        if result.skipped_count > 0 {
            log::info!("Skipped {} malformed entries", result.skipped_count);
        }
        result
    }

    /// `SET paper:<id>` then `ZADD index id published`.
    ///
    /// The index entry is only written once the value is acknowledged.
    fn store_article(&self, article: &Article, opts: &RunOptions) -> Result<bool, StoreError> {
        let json = article.to_json().map_err(|e| StoreError::write("SET", e))?;
        let set_opts = SetOptions {
            ttl_seconds: opts.ttl_seconds,
        };
        if !self.store.set(&paper_key(&article.id), &json, set_opts)? {
            return Ok(false);
        }
        let score = article.published_epoch() as f64;
        self.store
            .zadd(&opts.index_key, &[(article.id.as_str(), score)])?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_names() {
        assert_eq!(Report::from_name("fetched"), Some(Report::Fetched));
        assert_eq!(Report::from_name("stored"), Some(Report::Stored));
        assert_eq!(Report::from_name("both"), None);
        assert_eq!(Report::default(), Report::Fetched);
    }

    #[test]
    fn default_options() {
        let opts = RunOptions::default();
        assert!(opts.store_enabled);
        assert_eq!(opts.index_key, "climate_papers");
        assert_eq!(opts.read_back, Some(10));
        assert_eq!(opts.ttl_seconds, None);
    }

    #[test]
    fn messages() {
        let mut result = RunResult {
            fetched_count: 3,
            ..Default::default()
        };
        assert_eq!(
            result.message(),
            "Fetched 3 papers (store not available or not authenticated)"
        );
        result.persisted = true;
        result.stored_count = 3;
        assert_eq!(result.message(), "Fetched 3 papers and stored 3");
        result.visible_count = Some(10);
        assert_eq!(
            result.message(),
            "Fetched 3 papers, stored 3, and retrieved 10 from the store"
        );
    }
}
