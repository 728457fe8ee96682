//! Persisted key names

/// Prefix of per-article value keys
pub const PAPER_KEY_PREFIX: &str = "paper:";

/// Sorted set of article ids scored by publish time
pub const DEFAULT_INDEX_KEY: &str = "climate_papers";

/// `paper:<id>`
pub fn paper_key(id: &str) -> String {
    format!("{PAPER_KEY_PREFIX}{id}")
}
