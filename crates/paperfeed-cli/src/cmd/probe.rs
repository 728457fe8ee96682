//! Probe subcommand - check store reachability and credentials

use anyhow::{Result, bail};

use paperfeed_kv::open_store;

use super::print_summary;
use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let Some(store_config) = config.store.store_config() else {
        bail!("No store configured (set STORE_URL and STORE_API_TOKEN or [store] in the config)");
    };
    let read_only = if store_config.read_only_token.is_some() {
        "configured"
    } else {
        "not set (write token used for reads)"
    };
    let url = store_config.url.clone();
    let store = open_store(Some(store_config));

    let authenticated = store.probe_auth()?;
    print_summary(
        "Store",
        &[
            ("URL", url),
            ("Read-only token", read_only.to_string()),
            (
                "Authenticated",
                if authenticated { "yes" } else { "no" }.to_string(),
            ),
        ],
    );

    if !authenticated {
        bail!("Store rejected the configured token");
    }
    Ok(())
}
