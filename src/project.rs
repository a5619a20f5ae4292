//! Project root discovery and the on-disk layout beneath it.

use crate::config::PathsConfig;
use crate::error::{Result, ScoutError};
use std::path::{Path, PathBuf};

/// Walk `start` and its ancestors; the first directory containing `marker`
/// is the project root.
pub fn find_project_root(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).exists())
        .map(Path::to_path_buf)
}

/// Resolved locations of every input and artifact of a run.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    paths: PathsConfig,
}

impl ProjectLayout {
    /// Discover the root from the current working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::ProjectRoot`] when no ancestor carries
    /// `paths.root_marker`.
    pub fn discover(paths: PathsConfig) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd, paths)
    }

    /// Discover the root from `start` and its ancestors.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::ProjectRoot`] when no ancestor carries
    /// `paths.root_marker`.
    pub fn discover_from(start: &Path, paths: PathsConfig) -> Result<Self> {
        let root = find_project_root(start, &paths.root_marker).ok_or_else(|| {
            ScoutError::ProjectRoot(format!(
                "no directory above {} contains {}",
                start.display(),
                paths.root_marker
            ))
        })?;
        tracing::debug!(root = %root.display(), "project root found");
        Ok(Self { root, paths })
    }

    /// Use an explicit root without searching for the marker.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::ProjectRoot`] when `root` is not a directory.
    pub fn at(root: impl Into<PathBuf>, paths: PathsConfig) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ScoutError::ProjectRoot(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root, paths })
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding query files.
    pub fn queries_dir(&self) -> PathBuf {
        self.root.join(&self.paths.queries_dir)
    }

    /// Query file for `industry` (`<queries_dir>/<industry>.json`).
    pub fn queries_file(&self, industry: &str) -> PathBuf {
        let name = industry.strip_suffix(".json").unwrap_or(industry);
        self.queries_dir().join(format!("{name}.json"))
    }

    /// Root of all summary artifacts.
    pub fn summaries_root(&self) -> PathBuf {
        self.root.join(&self.paths.summaries_dir)
    }

    /// Root of all reports.
    pub fn reports_root(&self) -> PathBuf {
        self.root.join(&self.paths.reports_dir)
    }

    /// Dedup store file.
    pub fn processed_links_path(&self) -> PathBuf {
        self.root.join(&self.paths.processed_links_file)
    }

    /// Raw source snapshots.
    pub fn raw_sources_dir(&self) -> PathBuf {
        self.root.join(&self.paths.raw_sources_dir)
    }

    /// Rolling log files.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(&self.paths.logs_dir)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn finds_nearest_marked_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            find_project_root(&nested, ".git").as_deref(),
            Some(dir.path())
        );
    }

    #[test]
    fn marker_may_be_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("industry-scout.toml"), "").unwrap();
        let nested = dir.path().join("src");
        std::fs::create_dir(&nested).unwrap();

        assert_eq!(
            find_project_root(&nested, "industry-scout.toml").as_deref(),
            Some(dir.path())
        );
    }

    #[test]
    fn missing_marker_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_project_root(dir.path(), "no-such-marker-7f3a").is_none());
    }

    #[test]
    fn at_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProjectLayout::at(dir.path().join("nope"), PathsConfig::default()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn layout_paths() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::at(dir.path(), PathsConfig::default()).unwrap();
        let root = dir.path();

        assert_eq!(
            layout.queries_file("automation"),
            root.join("search_queries/automation.json")
        );
        assert_eq!(
            layout.queries_file("automation.json"),
            root.join("search_queries/automation.json")
        );
        assert_eq!(layout.summaries_root(), root.join("summarized_sources"));
        assert_eq!(layout.reports_root(), root.join("reports"));
        assert_eq!(
            layout.processed_links_path(),
            root.join("summarized_sources/processed_links.json")
        );
        assert_eq!(layout.logs_dir(), root.join("logs"));
    }

    #[test]
    fn discover_from_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("search_queries");
        std::fs::create_dir(&nested).unwrap();

        let layout = ProjectLayout::discover_from(&nested, PathsConfig::default()).unwrap();
        assert_eq!(layout.root(), dir.path());
        assert_eq!(
            layout.queries_file("energy"),
            dir.path().join("search_queries/energy.json")
        );
    }

    #[test]
    fn discover_from_without_marker_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathsConfig {
            root_marker: "no-such-marker-7f3a".into(),
            ..PathsConfig::default()
        };
        let err = ProjectLayout::discover_from(dir.path(), paths).unwrap_err();
        assert!(matches!(err, ScoutError::ProjectRoot(_)));
        assert!(err.is_fatal());
    }
}
