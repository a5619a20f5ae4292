//! Raw source snapshots: every discovered link with its page title, grouped
//! by industry and query, written to `raw_sources_<timestamp>.json`.

use crate::discovery::{LinkDiscovery, QueryOutcome};
use crate::error::{Result, ScoutError};
use crate::queries::QuerySet;
use crate::services::TitleProbe;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One probed link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLink {
    /// The page answered; `link` is the final URL after redirects.
    Titled {
        /// Final URL.
        link: String,
        /// Page title, or `"Title not found"`.
        title: String,
    },
    /// The probe failed.
    Failed {
        /// Requested URL.
        link: String,
        /// Failure description.
        error: String,
    },
}

/// `{industry: {query: [link, ...]}}`.
pub type Snapshot = BTreeMap<String, BTreeMap<String, Vec<RawLink>>>;

/// Search every query and probe every result link's title.
///
/// Each query's probes run in the discovery worker slot that searched it,
/// so probes of different queries overlap. Failed queries are logged and
/// left out of the snapshot.
pub async fn collect_snapshot(
    discovery: &LinkDiscovery,
    probe: Arc<dyn TitleProbe>,
    queries: &QuerySet,
) -> Snapshot {
    let probed = discovery.search_each(queries, move |outcome| {
        probe_query(outcome, Arc::clone(&probe))
    });
    futures_util::pin_mut!(probed);

    let mut snapshot = Snapshot::new();
    while let Some(entry) = probed.next().await {
        if let Some((industry, query, links)) = entry {
            snapshot.entry(industry).or_default().insert(query, links);
        }
    }
    snapshot
}

/// Probe every link of one search outcome; `None` when the search failed.
async fn probe_query(
    outcome: QueryOutcome,
    probe: Arc<dyn TitleProbe>,
) -> Option<(String, String, Vec<RawLink>)> {
    let QueryOutcome {
        industry,
        query,
        links,
    } = outcome;
    let links = match links {
        Ok(links) => links,
        Err(e) => {
            tracing::error!(query = %query, error = %e, "query failed");
            return None;
        }
    };
    if links.is_empty() {
        tracing::warn!(query = %query, "no search results found");
    }

    let probes = links.iter().map(|link| {
        let probe = Arc::clone(&probe);
        async move {
            match probe.probe(link).await {
                Ok(page) => RawLink::Titled {
                    link: page.link,
                    title: page.title,
                },
                Err(e) => {
                    tracing::warn!(url = %link, error = %e, "title probe failed");
                    RawLink::Failed {
                        link: link.clone(),
                        error: e.to_string(),
                    }
                }
            }
        }
    });
    let results = futures_util::future::join_all(probes).await;
    Some((industry, query, results))
}

/// Snapshot file name for `timestamp`.
pub fn snapshot_file_name(timestamp: chrono::DateTime<chrono::Local>) -> String {
    format!("raw_sources_{}.json", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Merge `snapshot` into `path` and rewrite it.
///
/// Queries already present under an industry are replaced; other queries
/// and industries in the file are kept. An unparseable existing file is
/// overwritten.
///
/// # Errors
///
/// Returns [`ScoutError::Store`] if the file cannot be written.
pub async fn write_snapshot(path: &Path, snapshot: Snapshot) -> Result<PathBuf> {
    let mut merged: Snapshot = match tokio::fs::read(path).await {
        Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!("overwriting malformed raw source file {}: {e}", path.display());
            Snapshot::new()
        }),
        _ => Snapshot::new(),
    };
    for (industry, queries) in snapshot {
        merged.entry(industry).or_default().extend(queries);
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ScoutError::Store(format!("failed to create {}: {e}", parent.display())))?;
    }
    let json = serde_json::to_vec_pretty(&merged)
        .map_err(|e| ScoutError::Store(format!("failed to serialize raw sources: {e}")))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| ScoutError::Store(format!("failed to write {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "raw sources saved");
    Ok(path.to_path_buf())
}
