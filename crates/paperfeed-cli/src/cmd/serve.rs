//! Serve subcommand - HTTP trigger for scheduled runs
//!
//! `GET /api/fetch-arxiv` runs the pipeline once with the configured search;
//! `GET /api/papers?count=N` lists the newest persisted papers;
//! `GET /api/fetchPapers?query=..&endDate=YYYY-MM-DD` searches arXiv
//! without touching the store.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use clap::Args;
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};

use paperfeed_arxiv::{Article, ArxivClient, DateRange, PaperSource, Search, normalize};
use paperfeed_core::SHARED_RUNTIME;
use paperfeed_kv::{SharedStore, StoreError, open_store};
use paperfeed_pipeline::{Pipeline, RunOptions, RunResult};

use crate::config::Config;

const DEFAULT_COUNT: usize = 10;
const MAX_COUNT: usize = 100;
const DEFAULT_TOPIC: &str = "climate change";

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address (default from config)
    #[arg(short, long)]
    pub bind: Option<String>,
}

/// Everything a request needs; cloned per request
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn PaperSource + Send + Sync>,
    store: SharedStore,
    search: Search,
    opts: RunOptions,
}

impl AppState {
    pub fn new(
        source: Arc<dyn PaperSource + Send + Sync>,
        store: SharedStore,
        search: Search,
        opts: RunOptions,
    ) -> Self {
        Self {
            source,
            store,
            search,
            opts,
        }
    }

    fn run_once(&self) -> RunResult {
        Pipeline::new(self.source.as_ref(), self.store.as_ref()).run(
            &self.search,
            &self.opts,
            &ProgressBar::hidden(),
        )
    }

    /// Empty unless the store is configured and authenticated
    fn latest(&self, count: usize) -> Result<Vec<Article>, StoreError> {
        if !self.store.is_configured() {
            return Ok(Vec::new());
        }
        match self.store.probe_auth() {
            Ok(true) => paperfeed_pipeline::latest(self.store.as_ref(), &self.opts.index_key, count),
            Ok(false) => Ok(Vec::new()),
            Err(e) => {
                log::warn!("{e}; listing nothing");
                Ok(Vec::new())
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct FetchResponse {
    message: String,
    papers: Vec<Article>,
    kv_auth: bool,
    fetched: usize,
    stored: usize,
    skipped: usize,
}

impl From<RunResult> for FetchResponse {
    fn from(result: RunResult) -> Self {
        Self {
            message: result.message(),
            kv_auth: result.persisted,
            fetched: result.fetched_count,
            stored: result.stored_count,
            skipped: result.skipped_count,
            papers: result.articles,
        }
    }
}

/// Reply of `/api/fetchPapers`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PapersPage {
    entries: Vec<Article>,
    total_results: usize,
    start_index: usize,
    items_per_page: usize,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn internal(error: String) -> ApiError {
    log::error!("{error}");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error }))
}

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error }))
}

#[derive(Debug, Deserialize)]
struct PapersQuery {
    count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct TopicQuery {
    query: Option<String>,
    max_results: Option<usize>,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
}

impl TopicQuery {
    /// All-fields phrase search, newest first, up to `endDate` inclusive
    fn search(&self) -> Result<Search, ApiError> {
        let topic = self.query.as_deref().unwrap_or(DEFAULT_TOPIC);
        let mut search = Search::new(format!("all:\"{topic}\""))
            .max_results(self.max_results.unwrap_or(DEFAULT_COUNT).min(MAX_COUNT));
        if let Some(end) = &self.end_date {
            let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
                .map_err(|e| bad_request(format!("Invalid endDate {end:?}: {e}")))?;
            search = search.date_range(DateRange::until(end));
        }
        Ok(search)
    }
}

/// GET /api/fetch-arxiv
async fn fetch_arxiv(State(state): State<AppState>) -> Result<Json<FetchResponse>, ApiError> {
    let result = tokio::task::spawn_blocking(move || state.run_once())
        .await
        .map_err(|e| internal(format!("Fetch task failed: {e}")))?;

    if let Some(e) = &result.source_error {
        return Err(internal(format!("Internal Server Error: {e}")));
    }
    Ok(Json(result.into()))
}

/// GET /api/papers
async fn papers(
    State(state): State<AppState>,
    Query(query): Query<PapersQuery>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let count = query.count.unwrap_or(DEFAULT_COUNT).min(MAX_COUNT);
    let papers = tokio::task::spawn_blocking(move || state.latest(count))
        .await
        .map_err(|e| internal(format!("Listing task failed: {e}")))?
        .map_err(|e| internal(format!("Error retrieving latest papers: {e}")))?;
    Ok(Json(papers))
}

/// GET /api/fetchPapers
async fn fetch_papers(
    State(state): State<AppState>,
    Query(query): Query<TopicQuery>,
) -> Result<Json<PapersPage>, ApiError> {
    let search = query.search()?;
    let items_per_page = search.max_results;
    log::info!("Searching arXiv: {}", search.search_query());

    let page = tokio::task::spawn_blocking(move || state.source.fetch_all(&search))
        .await
        .map_err(|e| internal(format!("Search task failed: {e}")))?
        .map_err(|e| internal(format!("Failed to fetch papers: {e}")))?;

    let entries: Vec<Article> = page
        .entries
        .iter()
        .filter_map(|raw| {
            normalize(raw)
                .inspect_err(|e| log::warn!("Skipping entry: {e}"))
                .ok()
        })
        .collect();
    Ok(Json(PapersPage {
        total_results: page.total_results.unwrap_or(entries.len()),
        start_index: 0,
        items_per_page,
        entries,
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/fetch-arxiv", get(fetch_arxiv))
        .route("/api/papers", get(papers))
        .route("/api/fetchPapers", get(fetch_papers))
        .with_state(state)
}

pub fn run(args: ServeArgs, config: &Config) -> Result<()> {
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let state = AppState::new(
        Arc::new(ArxivClient::new(config.arxiv.client_config())),
        open_store(config.store.store_config()),
        config.arxiv.search(),
        config.run.run_options()?,
    );
    log::info!("Store: {}", state.store.describe());
    let app = router(state);

    SHARED_RUNTIME.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&bind)
            .await
            .with_context(|| format!("Failed to bind {bind}"))?;
        log::info!("Listening on http://{}", listener.local_addr()?);
        axum::serve(listener, app).await.context("Server error")
    })
}
