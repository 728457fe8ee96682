//! Read back the newest persisted articles

use paperfeed_arxiv::Article;
use paperfeed_kv::{KvStore, StoreError};

use crate::keys::paper_key;

/// Newest `count` articles by publish time.
///
/// Only the index read is fatal. Ids whose value is missing, unreadable or
/// not valid article JSON are logged and left out.
pub fn latest(store: &dyn KvStore, index_key: &str, count: usize) -> Result<Vec<Article>, StoreError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let stop = i64::try_from(count).map_or(-1, |c| c - 1);
    let ids = store.zrevrange(index_key, 0, stop)?;
    log::debug!("{index_key}: {} ids in read-back window", ids.len());

    let mut articles = Vec::with_capacity(ids.len());
    for id in ids {
        match store.get(&paper_key(&id)) {
            Ok(Some(json)) => match Article::from_json(&json) {
                Ok(article) => articles.push(article),
                Err(e) => log::warn!("Stored paper {id} is not valid article JSON: {e}"),
            },
            Ok(None) => log::warn!("Failed to retrieve paper: {id}"),
            Err(e) => log::warn!("Failed to retrieve paper {id}: {e}"),
        }
    }
    Ok(articles)
}
