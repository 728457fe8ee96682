//! arXiv export API client with lazy pagination

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::time::Duration;

use paperfeed_core::http_client;

use crate::error::SourceError;
use crate::parser::{FeedPage, RawResult, parse_feed};
use crate::query::Search;

pub const DEFAULT_BASE_URL: &str = "https://export.arxiv.org/api/query";

/// Anything that can turn a [`Search`] into a result sequence.
///
/// The sequence is finite (bounded by `max_results`) and restartable:
/// every call starts from the first result again.
pub trait PaperSource {
    fn search<'a>(
        &'a self,
        search: &Search,
    ) -> Box<dyn Iterator<Item = Result<RawResult, SourceError>> + 'a>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Drain the whole sequence into one page.
    ///
    /// `total_results` is whatever the source reports as the full match
    /// count, which may exceed the entries returned.
    fn fetch_all(&self, search: &Search) -> Result<FeedPage, SourceError> {
        let entries = self.search(search).collect::<Result<Vec<_>, _>>()?;
        Ok(FeedPage {
            total_results: None,
            entries,
        })
    }
}

/// Client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Results requested per page
    pub page_size: usize,
    /// Pause between consecutive page requests (arXiv asks for 3s)
    pub page_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 100,
            page_delay: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArxivClient {
    config: ClientConfig,
}

impl ArxivClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Lazy result sequence; pages are requested as it is consumed.
    pub fn results(&self, search: &Search) -> Results<'_> {
        let query = search.clone();
        Results::new(
            search.max_results,
            self.config.page_size,
            self.config.page_delay,
            Box::new(move |start, count| self.fetch_page(&query, start, count)),
        )
    }

    /// Fetch one page of `count` results starting at `start`.
    pub fn fetch_page(
        &self,
        search: &Search,
        start: usize,
        count: usize,
    ) -> Result<FeedPage, SourceError> {
        let params = [
            ("search_query", search.search_query()),
            ("start", start.to_string()),
            ("max_results", count.to_string()),
            ("sortBy", search.sort_by.as_param().to_string()),
            ("sortOrder", search.sort_order.as_param().to_string()),
        ];
        log::debug!(
            "arXiv page: query={:?} start={start} count={count}",
            params[0].1
        );

        let request = http_client().get(&self.config.base_url).query(&params);
        let resp = paperfeed_core::send(request)?.error_for_status()?;
        parse_feed(&resp.body)
    }
}

impl PaperSource for ArxivClient {
    fn search<'a>(
        &'a self,
        search: &Search,
    ) -> Box<dyn Iterator<Item = Result<RawResult, SourceError>> + 'a> {
        Box::new(self.results(search))
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    fn fetch_all(&self, search: &Search) -> Result<FeedPage, SourceError> {
        let mut results = self.results(search);
        let entries = results.by_ref().collect::<Result<Vec<_>, _>>()?;
        Ok(FeedPage {
            total_results: results.total_results(),
            entries,
        })
    }
}

type PageFn<'a> = Box<dyn FnMut(usize, usize) -> Result<FeedPage, SourceError> + 'a>;

/// Lazily paged result sequence.
///
/// Ends after `max_results` items, an empty page, or once the feed's
/// total is reached. After yielding an error it yields nothing more.
pub struct Results<'a> {
    fetch: PageFn<'a>,
    max_results: usize,
    page_size: usize,
    page_delay: Duration,
    buffer: VecDeque<RawResult>,
    /// Results requested so far (next `start`)
    offset: usize,
    yielded: usize,
    total: Option<usize>,
    pages: usize,
    done: bool,
}

impl<'a> Results<'a> {
    fn new(max_results: usize, page_size: usize, page_delay: Duration, fetch: PageFn<'a>) -> Self {
        Self {
            fetch,
            max_results,
            page_size: page_size.max(1),
            page_delay,
            buffer: VecDeque::new(),
            offset: 0,
            yielded: 0,
            total: None,
            pages: 0,
            done: false,
        }
    }

    /// Pages requested so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Match count reported by the most recent page, if any.
    pub fn total_results(&self) -> Option<usize> {
        self.total
    }

    fn fill(&mut self) -> Result<(), SourceError> {
        if self.total.is_some_and(|total| self.offset >= total) {
            return Ok(());
        }
        if self.pages > 0 && !self.page_delay.is_zero() {
            std::thread::sleep(self.page_delay);
        }

        let count = self.max_results.saturating_sub(self.offset).min(self.page_size);
        let page = (self.fetch)(self.offset, count)?;
        self.pages += 1;
        self.total = page.total_results.or(self.total);
        self.offset += page.entries.len();
        self.buffer.extend(page.entries);
        Ok(())
    }
}

impl Iterator for Results<'_> {
    type Item = Result<RawResult, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.yielded >= self.max_results {
            return None;
        }
        if self.buffer.is_empty() {
            if let Err(e) = self.fill() {
                self.done = true;
                return Some(Err(e));
            }
            if self.buffer.is_empty() {
                self.done = true;
                return None;
            }
        }
        let raw = self.buffer.pop_front()?;
        self.yielded += 1;
        Some(Ok(raw))
    }
}

impl FusedIterator for Results<'_> {}
