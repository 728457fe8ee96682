//! Raw feed entry → canonical [`Article`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;
use crate::parser::RawResult;

/// Canonical article record, as persisted under `paper:<id>`.
///
/// Field order and names are part of the stored format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Entry identifier; storage and dedupe key
    pub id: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    pub published: DateTime<Utc>,
    pub pdf_url: String,
    pub link: String,
    pub categories: Vec<String>,
}

impl Article {
    /// Publication time as epoch seconds (sorted-set score)
    pub fn published_epoch(&self) -> i64 {
        self.published.timestamp()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Normalize one entry. Pure; same input gives byte-identical JSON.
pub fn normalize(raw: &RawResult) -> Result<Article, NormalizeError> {
    let id = raw.entry_id.trim();
    if id.is_empty() {
        return Err(malformed(id, "missing entry id"));
    }

    let published = DateTime::parse_from_rfc3339(raw.published.trim())
        .map_err(|e| malformed(id, &format!("published {:?}: {e}", raw.published)))?
        .with_timezone(&Utc);

    let link = raw.alternate_link().unwrap_or(id).to_string();
    let pdf_url = match raw.pdf_link() {
        Some(href) => href.to_string(),
        None => id.replacen("/abs/", "/pdf/", 1),
    };

    Ok(Article {
        id: id.to_string(),
        title: collapse_whitespace(&raw.title),
        summary: raw.summary.trim().to_string(),
        authors: raw.authors.clone(),
        published,
        pdf_url,
        link,
        categories: dedupe(&raw.categories),
    })
}

fn malformed(id: &str, reason: &str) -> NormalizeError {
    NormalizeError::MalformedRecord {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

/// Titles arrive hard-wrapped; fold runs of whitespace into single spaces.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn dedupe(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}
