//! Fetch subcommand - one fetch-normalize-persist run

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};

use paperfeed_arxiv::{ArxivClient, DateRange, Search, SortCriterion};
use paperfeed_core::{SharedProgress, fmt_num};
use paperfeed_kv::open_store;
use paperfeed_pipeline::{Pipeline, Report};

use super::{print_articles, print_summary};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Search query (default from config)
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum number of results
    #[arg(short = 'n', long)]
    pub max_results: Option<usize>,

    /// Only papers submitted yesterday (local time)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub yesterday: bool,

    /// First submission day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last submission day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Sort field
    #[arg(long, value_enum, default_value = "submitted-date")]
    pub sort_by: SortArg,

    /// Fetch only, never write to the store
    #[arg(long)]
    pub no_store: bool,

    /// Newest stored papers to read back after the run (0 disables)
    #[arg(long)]
    pub read_back: Option<usize>,

    /// Which papers to print
    #[arg(long, value_enum)]
    pub report: Option<ReportArg>,

    /// Expire stored values after this many seconds
    #[arg(long)]
    pub ttl: Option<u64>,

    /// Print papers as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum SortArg {
    Relevance,
    LastUpdatedDate,
    SubmittedDate,
}

impl From<SortArg> for SortCriterion {
    fn from(s: SortArg) -> Self {
        match s {
            SortArg::Relevance => SortCriterion::Relevance,
            SortArg::LastUpdatedDate => SortCriterion::LastUpdatedDate,
            SortArg::SubmittedDate => SortCriterion::SubmittedDate,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum ReportArg {
    Fetched,
    Stored,
}

impl From<ReportArg> for Report {
    fn from(r: ReportArg) -> Self {
        match r {
            ReportArg::Fetched => Report::Fetched,
            ReportArg::Stored => Report::Stored,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date format: {e}"))
}

/// Config search with CLI overrides applied
fn build_search(args: &FetchArgs, config: &Config) -> Result<Search> {
    let mut search = Search::new(args.query.clone().unwrap_or_else(|| config.arxiv.query.clone()))
        .max_results(args.max_results.unwrap_or(config.arxiv.max_results))
        .sort_by(args.sort_by.into());

    if args.yesterday {
        search = search.date_range(DateRange::yesterday());
    } else if let (Some(from), Some(to)) = (args.from, args.to) {
        let range = DateRange::new(from, to)
            .ok_or_else(|| anyhow!("--from {from} is after --to {to}"))?;
        search = search.date_range(range);
    }
    Ok(search)
}

pub fn run(args: FetchArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let search = build_search(&args, config)?;

    let mut opts = config.run.run_options()?;
    opts.store_enabled = !args.no_store;
    if let Some(n) = args.read_back {
        opts.read_back = (n > 0).then_some(n);
    }
    if let Some(report) = args.report {
        opts.report = report.into();
    }
    if args.ttl.is_some() {
        opts.ttl_seconds = args.ttl;
    }

    let client = ArxivClient::new(config.arxiv.client_config());
    let store = open_store(config.store.store_config());

    log::info!("Fetching arXiv papers");
    log::info!("  Query: {}", search.search_query());
    log::info!("  Store: {}", store.describe());

    let pb = progress.run_bar("arXiv", search.max_results as u64);
    let result = Pipeline::new(&client, store.as_ref()).run(&search, &opts, &pb);

    print_articles(&result.articles, args.json)?;

    let mut rows = vec![
        ("Fetched", fmt_num(result.fetched_count)),
        ("Stored", fmt_num(result.stored_count)),
        ("Skipped", fmt_num(result.skipped_count)),
        (
            "Persistence",
            if result.persisted { "on" } else { "off" }.to_string(),
        ),
    ];
    if let Some(visible) = result.visible_count {
        rows.push(("Read back", fmt_num(visible)));
    }
    rows.push(("Time", format!("{:.1}s", result.elapsed.as_secs_f64())));
    print_summary("arXiv", &rows);

    match result.source_error {
        Some(e) => Err(anyhow!("arXiv fetch failed after {} results: {e}", result.fetched_count)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        fetch: FetchArgs,
    }

    fn parse(args: &[&str]) -> Result<FetchArgs, clap::Error> {
        TestCli::try_parse_from(std::iter::once("fetch").chain(args.iter().copied()))
            .map(|cli| cli.fetch)
    }

    #[test]
    fn defaults_come_from_config() {
        let args = parse(&[]).unwrap();
        let search = build_search(&args, &Config::default()).unwrap();
        assert_eq!(search.search_query(), "climate");
        assert_eq!(search.max_results, 10);
    }

    #[test]
    fn flags_override_config() {
        let args = parse(&["-q", "sea ice", "-n", "5"]).unwrap();
        let search = build_search(&args, &Config::default()).unwrap();
        assert_eq!(search.search_query(), "sea ice");
        assert_eq!(search.max_results, 5);
    }

    #[test]
    fn explicit_date_range() {
        let args = parse(&["--from", "2024-03-01", "--to", "2024-03-02"]).unwrap();
        let search = build_search(&args, &Config::default()).unwrap();
        assert_eq!(
            search.search_query(),
            "climate AND submittedDate:[202403010000 TO 202403022359]"
        );
    }

    #[test]
    fn reversed_range_rejected() {
        let args = parse(&["--from", "2024-03-02", "--to", "2024-03-01"]).unwrap();
        assert!(build_search(&args, &Config::default()).is_err());
    }

    #[test]
    fn from_requires_to() {
        assert!(parse(&["--from", "2024-03-01"]).is_err());
    }

    #[test]
    fn yesterday_conflicts_with_range() {
        assert!(parse(&["--yesterday", "--from", "2024-03-01", "--to", "2024-03-02"]).is_err());
    }

    #[test]
    fn bad_date_rejected() {
        assert!(parse(&["--from", "03/01/2024", "--to", "2024-03-02"]).is_err());
    }
}
