//! Durable record of links that already have a summary.
//!
//! The store is a JSON document `{industry: {url: relative-summary-path}}`.
//! Entries are only ever added. Every [`DedupStore::record`] re-reads the
//! file, merges, and atomically replaces it while holding the store's lock,
//! so concurrent writers in this process never drop each other's keys.

use crate::error::{Result, ScoutError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type Entries = BTreeMap<String, BTreeMap<String, String>>;

/// Persisted processed-link set.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl DedupStore {
    /// Load the store at `path`.
    ///
    /// A missing or unparseable file yields an empty store. The file itself
    /// is left untouched until the next [`record`](Self::record).
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path).await;
        let count: usize = entries.values().map(BTreeMap::len).sum();
        tracing::info!(path = %path.display(), links = count, "dedup store loaded");
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` when `(industry, url)` has already been summarised.
    pub async fn contains(&self, industry: &str, url: &str) -> bool {
        self.entries
            .lock()
            .await
            .get(industry)
            .is_some_and(|urls| urls.contains_key(url))
    }

    /// Recorded location for `(industry, url)`.
    pub async fn location(&self, industry: &str, url: &str) -> Option<String> {
        self.entries
            .lock()
            .await
            .get(industry)
            .and_then(|urls| urls.get(url).cloned())
    }

    /// Number of recorded links across all industries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.values().map(BTreeMap::len).sum()
    }

    /// `true` when nothing has been recorded.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Record `(industry, url) -> location` and persist the merged store.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Store`] when the file cannot be written. The
    /// in-memory store is then left unchanged, so the link is not reported
    /// as processed.
    pub async fn record(&self, industry: &str, url: &str, location: &Path) -> Result<()> {
        let mut entries = self.entries.lock().await;

        let mut updated = entries.clone();
        merge(&mut updated, read_entries(&self.path).await);
        updated
            .entry(industry.to_owned())
            .or_default()
            .insert(url.to_owned(), location.to_string_lossy().into_owned());

        write_entries(&self.path, &updated).await?;
        *entries = updated;
        tracing::debug!(industry, url, "link recorded as processed");
        Ok(())
    }
}

fn merge(into: &mut Entries, from: Entries) {
    for (industry, urls) in from {
        let target = into.entry(industry).or_default();
        for (url, location) in urls {
            target.entry(url).or_insert(location);
        }
    }
}

async fn read_entries(path: &Path) -> Entries {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Entries::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read dedup store, treating as empty");
            return Entries::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(
                "ignoring malformed dedup store at {}: {e}",
                path.display()
            );
            Entries::new()
        }
    }
}

async fn write_entries(path: &Path, entries: &Entries) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            ScoutError::Store(format!("failed to create dedup store directory: {e}"))
        })?;
    }

    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_vec_pretty(entries)
        .map_err(|e| ScoutError::Store(format!("failed to serialize dedup store: {e}")))?;
    tokio::fs::write(&tmp_path, json).await.map_err(|e| {
        ScoutError::Store(format!("failed to write dedup store temp file: {e}"))
    })?;
    tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
        ScoutError::Store(format!("failed to finalize dedup store file: {e}"))
    })?;
    Ok(())
}
