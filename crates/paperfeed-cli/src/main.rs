//! paperfeed - Fetch recent arXiv papers into a REST key/value store
//!
//! Searches the arXiv export API, normalizes each entry, and upserts it into
//! an Upstash / Vercel KV style store indexed by publish time.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "paperfeed")]
#[command(about = "Fetch recent arXiv papers into a REST key/value store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./paperfeed.toml or ~/.config/paperfeed/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Connect timeout in seconds
    #[arg(long, global = true)]
    connect_timeout: Option<u64>,

    /// Whole-request timeout in seconds
    #[arg(long, global = true)]
    request_timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch papers and persist them
    Fetch(cmd::fetch::FetchArgs),
    /// List the newest persisted papers
    Latest(cmd::latest::LatestArgs),
    /// Check store credentials
    Probe,
    /// Serve the HTTP trigger endpoints
    Serve(cmd::serve::ServeArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Before logging so RUST_LOG from .env applies
    let dotenv = dotenvy::dotenv();

    let progress = Arc::new(paperfeed_core::ProgressContext::new());
    paperfeed_core::init_logging(cli.debug, progress.multi());

    match dotenv {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring .env: {e}"),
    }

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    if let Some(secs) = cli.connect_timeout {
        config.http.connect_timeout = secs;
    }
    if let Some(secs) = cli.request_timeout {
        config.http.request_timeout = secs;
    }
    paperfeed_core::set_http_config(config.http_config());

    match cli.command {
        Command::Fetch(args) => cmd::fetch::run(args, &config, &progress),
        Command::Latest(args) => cmd::latest::run(args, &config),
        Command::Probe => cmd::probe::run(&config),
        Command::Serve(args) => cmd::serve::run(args, &config),
        Command::Config => {
            let store = config.store.store_config();
            let set_or_not = |set: bool| (if set { "configured" } else { "not set" }).to_string();
            cmd::print_summary(
                "Setting",
                &[
                    ("arXiv base URL", config.arxiv.base_url.clone()),
                    ("Query", config.arxiv.query.clone()),
                    ("Max results", config.arxiv.max_results.to_string()),
                    (
                        "Paging",
                        format!(
                            "{} per page, {}ms apart",
                            config.arxiv.page_size, config.arxiv.page_delay_ms
                        ),
                    ),
                    (
                        "Store URL",
                        store
                            .as_ref()
                            .map_or_else(|| "not set".to_string(), |s| s.url.clone()),
                    ),
                    ("Store token", set_or_not(store.is_some())),
                    (
                        "Read-only token",
                        set_or_not(store.as_ref().is_some_and(|s| s.read_only_token.is_some())),
                    ),
                    ("Index key", config.run.index_key.clone()),
                    ("Read back", config.run.read_back.to_string()),
                    ("Report", config.run.report.clone()),
                    (
                        "TTL",
                        config
                            .run
                            .ttl_seconds
                            .map_or_else(|| "none".to_string(), |s| format!("{s}s")),
                    ),
                    ("Bind", config.server.bind.clone()),
                    (
                        "Timeouts",
                        format!(
                            "connect {}s, request {}s",
                            config.http.connect_timeout, config.http.request_timeout
                        ),
                    ),
                ],
            );
            Ok(())
        }
    }
}
