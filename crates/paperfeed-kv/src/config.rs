//! Store endpoint and credentials

/// Variable names checked in order; the first set, non-empty one wins.
pub const URL_VARS: &[&str] = &["STORE_URL", "KV_REST_API_URL"];
pub const TOKEN_VARS: &[&str] = &["STORE_API_TOKEN", "KV_REST_API_TOKEN"];
pub const READ_ONLY_TOKEN_VARS: &[&str] = &["STORE_READ_ONLY_TOKEN", "KV_REST_API_READ_ONLY_TOKEN"];

/// First of `names` set to a non-blank value in the environment
pub fn first_env(names: &[&str]) -> Option<String> {
    first_set(names, |n| std::env::var(n).ok())
}

fn first_set(names: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    names.iter().find_map(|n| non_blank(lookup(n)))
}

/// REST endpoint plus bearer tokens
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub token: String,
    /// Used for GET / ZREVRANGE when set
    pub read_only_token: Option<String>,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field(
                "read_only_token",
                &self.read_only_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            read_only_token: None,
        }
    }

    pub fn with_read_only_token(mut self, token: impl Into<String>) -> Self {
        self.read_only_token = Some(token.into());
        self
    }

    /// Build from URL and tokens that may be missing or blank.
    ///
    /// Returns `None` unless both URL and write token are present.
    pub fn from_parts(
        url: Option<String>,
        token: Option<String>,
        read_only_token: Option<String>,
    ) -> Option<Self> {
        let url = non_blank(url)?;
        let token = non_blank(token)?;
        Some(Self {
            url,
            token,
            read_only_token: non_blank(read_only_token),
        })
    }

    /// Token for read-only commands
    pub fn read_token(&self) -> &str {
        self.read_only_token.as_deref().unwrap_or(&self.token)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Resolve a config from `vars` the way the CLI does from the environment
    fn resolve(vars: &[(&str, &str)]) -> Option<StoreConfig> {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        let lookup = |name: &str| map.get(name).map(|v| v.to_string());
        StoreConfig::from_parts(
            first_set(URL_VARS, lookup),
            first_set(TOKEN_VARS, lookup),
            first_set(READ_ONLY_TOKEN_VARS, lookup),
        )
    }

    #[test]
    fn primary_names() {
        let config = resolve(&[
            ("STORE_URL", "https://kv.example.com"),
            ("STORE_API_TOKEN", "w"),
            ("STORE_READ_ONLY_TOKEN", "r"),
        ])
        .unwrap();
        assert_eq!(config.url, "https://kv.example.com");
        assert_eq!(config.token, "w");
        assert_eq!(config.read_token(), "r");
    }

    #[test]
    fn legacy_names() {
        let config = resolve(&[
            ("KV_REST_API_URL", "https://legacy.example.com"),
            ("KV_REST_API_TOKEN", "t"),
        ])
        .unwrap();
        assert_eq!(config.url, "https://legacy.example.com");
        assert_eq!(config.read_token(), "t");
    }

    #[test]
    fn primary_wins_over_legacy() {
        let config = resolve(&[
            ("STORE_URL", "https://new"),
            ("KV_REST_API_URL", "https://old"),
            ("STORE_API_TOKEN", "t"),
        ])
        .unwrap();
        assert_eq!(config.url, "https://new");
    }

    #[test]
    fn missing_token_means_unconfigured() {
        assert!(resolve(&[("STORE_URL", "https://kv")]).is_none());
        assert!(resolve(&[("STORE_URL", "https://kv"), ("STORE_API_TOKEN", "  ")]).is_none());
    }

    #[test]
    fn debug_redacts_tokens() {
        let config = StoreConfig::new("https://kv", "supersecret").with_read_only_token("alsosecret");
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("supersecret"));
        assert!(!dbg.contains("alsosecret"));
        assert!(dbg.contains("https://kv"));
    }
}
