//! Summary artifacts: one Markdown file per (industry, host).
//!
//! The file name is derived from the URL host only, so two URLs on the same
//! host share one artifact and the later write replaces the earlier one.

use crate::error::{Result, ScoutError};
use std::path::{Path, PathBuf};
use url::Url;

/// A summary file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryArtifact {
    /// Absolute path.
    pub path: PathBuf,
    /// File name without `.md`.
    pub stem: String,
}

impl SummaryArtifact {
    /// Read the artifact's content.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Io`] if the file cannot be read.
    pub async fn read(&self) -> Result<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

/// Reads and writes summary artifacts under one root directory.
#[derive(Debug, Clone)]
pub struct SummaryStore {
    root: PathBuf,
}

impl SummaryStore {
    /// Store rooted at `root` (one sub-directory per industry).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one industry's artifacts.
    pub fn industry_dir(&self, industry: &str) -> PathBuf {
        self.root.join(industry)
    }

    /// Deterministic artifact location for `url`.
    pub fn artifact_path(&self, industry: &str, url: &str) -> PathBuf {
        self.industry_dir(industry)
            .join(format!("{}.md", artifact_name(url)))
    }

    /// Write `URL: <url>\n\n<summary>` to the artifact path, replacing any
    /// previous content.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Store`] if the directory or file cannot be
    /// written.
    pub async fn save(&self, industry: &str, url: &str, summary: &str) -> Result<PathBuf> {
        let path = self.artifact_path(industry, url);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ScoutError::Store(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        tokio::fs::write(&path, format!("URL: {url}\n\n{summary}"))
            .await
            .map_err(|e| ScoutError::Store(format!("failed to write {}: {e}", path.display())))?;
        tracing::info!(url, path = %path.display(), "summary saved");
        Ok(path)
    }

    /// Artifacts of `industry`, sorted by file name, or `None` when the
    /// industry directory does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Io`] if the directory cannot be listed.
    pub async fn list(&self, industry: &str) -> Result<Option<Vec<SummaryArtifact>>> {
        let dir = self.industry_dir(industry);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut artifacts = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "md") {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            artifacts.push(SummaryArtifact {
                stem: stem.to_owned(),
                path,
            });
        }
        artifacts.sort_by(|a, b| a.stem.cmp(&b.stem));
        Ok(Some(artifacts))
    }
}

/// Host of `url` without a leading `www.`, or a sanitised form of the whole
/// string when it has no host.
pub fn artifact_name(url: &str) -> String {
    if let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_owned)) {
        return host.strip_prefix("www.").unwrap_or(&host).to_owned();
    }
    let sanitised: String = url
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    if sanitised.is_empty() {
        "unnamed".to_owned()
    } else {
        sanitised
    }
}
