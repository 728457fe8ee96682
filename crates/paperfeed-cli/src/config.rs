//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use paperfeed_arxiv::{ClientConfig, Search, client::DEFAULT_BASE_URL};
use paperfeed_kv::StoreConfig;
use paperfeed_kv::config::{READ_ONLY_TOKEN_VARS, TOKEN_VARS, URL_VARS, first_env};
use paperfeed_pipeline::{DEFAULT_INDEX_KEY, Report, RunOptions};

/// Global configuration for paperfeed
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub arxiv: ArxivConfig,
    pub store: StoreSection,
    pub run: RunConfig,
    pub server: ServerConfig,
    pub http: HttpSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArxivConfig {
    pub base_url: String,
    pub query: String,
    pub max_results: usize,
    pub page_size: usize,
    pub page_delay_ms: u64,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            query: "climate".to_string(),
            max_results: 10,
            page_size: 100,
            page_delay_ms: 3000,
        }
    }
}

impl ArxivConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            page_size: self.page_size.max(1),
            page_delay: Duration::from_millis(self.page_delay_ms),
        }
    }

    /// The configured query, newest submissions first
    pub fn search(&self) -> Search {
        Search::new(self.query.clone()).max_results(self.max_results)
    }
}

/// Store credentials; unset fields fall back to the environment.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    #[serde(deserialize_with = "deserialize_env_var")]
    pub url: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub token: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub read_only_token: Option<String>,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url: first_env(URL_VARS),
            token: first_env(TOKEN_VARS),
            read_only_token: first_env(READ_ONLY_TOKEN_VARS),
        }
    }
}

impl std::fmt::Debug for StoreSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSection")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field(
                "read_only_token",
                &self.read_only_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl StoreSection {
    /// `None` unless both URL and write token are present
    pub fn store_config(&self) -> Option<StoreConfig> {
        StoreConfig::from_parts(
            self.url.clone(),
            self.token.clone(),
            self.read_only_token.clone(),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub index_key: String,
    /// Newest articles to read back after persisting; 0 disables
    pub read_back: usize,
    /// `fetched` or `stored`
    pub report: String,
    pub ttl_seconds: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            index_key: DEFAULT_INDEX_KEY.to_string(),
            read_back: 10,
            report: "fetched".to_string(),
            ttl_seconds: None,
        }
    }
}

impl RunConfig {
    pub fn run_options(&self) -> Result<RunOptions> {
        let report = Report::from_name(&self.report).with_context(|| {
            format!(
                "Invalid run.report {:?} (expected \"fetched\" or \"stored\")",
                self.report
            )
        })?;
        Ok(RunOptions {
            store_enabled: true,
            index_key: self.index_key.clone(),
            read_back: (self.read_back > 0).then_some(self.read_back),
            report,
            ttl_seconds: self.ttl_seconds,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeouts in seconds
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub connect_timeout: u64,
    pub request_timeout: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            connect_timeout: 30,
            request_timeout: 60,
        }
    }
}

/// Deserialize a string that may be an environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to the variable's value; other strings pass through
fn expand_env_var(s: &str) -> Option<String> {
    match s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).ok(),
        None => Some(s.to_string()),
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./paperfeed.toml (current directory)
    /// 2. ~/.config/paperfeed/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("paperfeed.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", "paperfeed") {
            let user_config = dirs.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn http_config(&self) -> paperfeed_core::HttpConfig {
        paperfeed_core::HttpConfig {
            connect_timeout: Duration::from_secs(self.http.connect_timeout),
            request_timeout: Duration::from_secs(self.http.request_timeout),
        }
    }
}
