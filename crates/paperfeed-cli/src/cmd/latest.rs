//! Latest subcommand - list the newest persisted papers

use anyhow::{Result, bail};
use clap::Args;

use paperfeed_kv::open_store;

use super::print_articles;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct LatestArgs {
    /// Number of papers
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: usize,

    /// Print papers as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: LatestArgs, config: &Config) -> Result<()> {
    let store = open_store(config.store.store_config());
    if !store.is_configured() {
        bail!("No store configured (set STORE_URL and STORE_API_TOKEN or [store] in the config)");
    }

    let articles = paperfeed_pipeline::latest(store.as_ref(), &config.run.index_key, args.count)?;
    log::info!(
        "{} of {} requested papers from {}",
        articles.len(),
        args.count,
        config.run.index_key
    );
    print_articles(&articles, args.json)
}
