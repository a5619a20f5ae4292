//! Report aggregation: judge every summary of an industry and fold the
//! verdicts into one timestamped Markdown report.
//!
//! Judgments are cached on disk as `<stem>_report.md` next to the reports;
//! a non-empty cached judgment is never requested again. Final reports are
//! append-only: each run writes a new file.

pub mod parse;
pub mod render;

pub use parse::{Judgment, parse_judgment};
pub use render::{display_industry, render_report};

use crate::error::{Result, ScoutError};
use crate::prompts::REPORT_TEMPLATE;
use crate::services::Judge;
use crate::summaries::SummaryStore;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Judgment requests made by one aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JudgeSummary {
    /// Summaries found.
    pub summaries: usize,
    /// Summaries judged in this run.
    pub judged: usize,
    /// Summaries with a cached judgment.
    pub cached: usize,
    /// Judgment requests that failed.
    pub failed: usize,
}

/// Builds per-industry reliability reports from summary artifacts.
pub struct ReportAggregator {
    judge: Arc<dyn Judge>,
    summaries: SummaryStore,
    reports_root: PathBuf,
}

impl std::fmt::Debug for ReportAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportAggregator")
            .field("summaries", &self.summaries)
            .field("reports_root", &self.reports_root)
            .finish_non_exhaustive()
    }
}

impl ReportAggregator {
    /// Aggregator reading from `summaries` and writing under `reports_root`.
    pub fn new(judge: Arc<dyn Judge>, summaries: SummaryStore, reports_root: impl Into<PathBuf>) -> Self {
        Self {
            judge,
            summaries,
            reports_root: reports_root.into(),
        }
    }

    /// Final reports of `industry`.
    pub fn reports_dir(&self, industry: &str) -> PathBuf {
        self.reports_root.join(industry)
    }

    /// Cached judgments of `industry`.
    pub fn judgments_dir(&self, industry: &str) -> PathBuf {
        self.reports_dir(industry).join("for_each_summary")
    }

    /// Judge pending summaries and write a new report.
    ///
    /// Returns `None` when `industry` has no summary directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Io`] or [`ScoutError::Report`] when summaries
    /// cannot be listed or the report cannot be written. Individual
    /// judgment failures are logged and leave that summary out.
    pub async fn aggregate(&self, industry: &str) -> Result<Option<PathBuf>> {
        self.aggregate_at(industry, Local::now()).await
    }

    /// [`aggregate`](Self::aggregate) with an explicit report timestamp.
    ///
    /// # Errors
    ///
    /// Same as [`aggregate`](Self::aggregate).
    pub async fn aggregate_at(&self, industry: &str, now: DateTime<Local>) -> Result<Option<PathBuf>> {
        let Some(judged) = self.judge_pending(industry).await? else {
            tracing::info!(industry, "no summaries directory, report skipped");
            return Ok(None);
        };
        tracing::info!(
            industry,
            summaries = judged.summaries,
            judged = judged.judged,
            cached = judged.cached,
            failed = judged.failed,
            "summaries judged"
        );

        let judgments = self.load_judgments(industry).await?;
        let (selected, rejected): (Vec<_>, Vec<_>) =
            judgments.into_iter().partition(|j| j.reliable);

        let report = render_report(industry, &selected, &rejected);
        let path = self.write_report(industry, now, &report).await?;
        tracing::info!(
            industry,
            selected = selected.len(),
            rejected = rejected.len(),
            path = %path.display(),
            "report written"
        );
        Ok(Some(path))
    }

    /// Request a judgment for every summary without a non-empty cached one.
    ///
    /// Returns `None` when `industry` has no summary directory.
    ///
    /// # Errors
    ///
    /// Returns an error when summaries cannot be listed or the judgments
    /// directory cannot be created.
    pub async fn judge_pending(&self, industry: &str) -> Result<Option<JudgeSummary>> {
        let Some(artifacts) = self.summaries.list(industry).await? else {
            return Ok(None);
        };

        let dir = self.judgments_dir(industry);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ScoutError::Report(format!("failed to create {}: {e}", dir.display())))?;

        let mut summary = JudgeSummary {
            summaries: artifacts.len(),
            ..JudgeSummary::default()
        };
        for artifact in artifacts {
            let path = dir.join(format!("{}_report.md", artifact.stem));
            if has_content(&path).await {
                summary.cached += 1;
                continue;
            }

            let text = match artifact.read().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(path = %artifact.path.display(), error = %e, "unreadable summary");
                    summary.failed += 1;
                    continue;
                }
            };
            match self.judge.judge(&text, industry, REPORT_TEMPLATE).await {
                Ok(verdict) => {
                    tokio::fs::write(&path, verdict).await.map_err(|e| {
                        ScoutError::Report(format!("failed to write {}: {e}", path.display()))
                    })?;
                    summary.judged += 1;
                }
                Err(e) => {
                    tracing::warn!(summary = %artifact.stem, error = %e, "judgment failed");
                    summary.failed += 1;
                }
            }
        }
        Ok(Some(summary))
    }

    /// Parse every cached judgment of `industry`, in file-name order.
    ///
    /// Files without a `url` field are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Io`] if the judgments directory cannot be read.
    pub async fn load_judgments(&self, industry: &str) -> Result<Vec<Judgment>> {
        let dir = self.judgments_dir(industry);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                files.push(path);
            }
        }
        files.sort();

        let mut judgments = Vec::with_capacity(files.len());
        for path in files {
            let text = match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable judgment");
                    continue;
                }
            };
            match parse_judgment(&text) {
                Some(judgment) => judgments.push(judgment),
                None => tracing::info!(path = %path.display(), "judgment has no url, skipped"),
            }
        }
        Ok(judgments)
    }

    async fn write_report(&self, industry: &str, now: DateTime<Local>, report: &str) -> Result<PathBuf> {
        let dir = self.reports_dir(industry);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ScoutError::Report(format!("failed to create {}: {e}", dir.display())))?;

        let base = format!("{industry}_total_report_{}", now.format("%Y%m%d_%H%M%S"));
        for attempt in 0..100u32 {
            let name = if attempt == 0 {
                format!("{base}.md")
            } else {
                format!("{base}_{attempt}.md")
            };
            let path = dir.join(name);
            match create_new(&path, report).await {
                Ok(()) => return Ok(path),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(ScoutError::Report(format!(
                        "failed to write {}: {e}",
                        path.display()
                    )));
                }
            }
        }
        Err(ScoutError::Report(format!(
            "too many reports named {base} in {}",
            dir.display()
        )))
    }
}

async fn create_new(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await
}

async fn has_content(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file() && meta.len() > 0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct EchoJudge;

    #[async_trait]
    impl Judge for EchoJudge {
        async fn judge(&self, summary: &str, _industry: &str, _template: &str) -> Result<String> {
            let url = summary
                .lines()
                .next()
                .and_then(|l| l.strip_prefix("URL: "))
                .unwrap_or_default();
            if url.contains("fail") {
                return Err(ScoutError::Llm("timeout".into()));
            }
            Ok(format!(
                "{{\n\"url\": \"{url}\",\n\"reliable\": \"Yes\",\n\"reason\": \"ok\"\n}}"
            ))
        }
    }

    #[tokio::test]
    async fn missing_summaries_dir_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let aggregator = ReportAggregator::new(
            Arc::new(EchoJudge),
            SummaryStore::new(dir.path().join("summaries")),
            dir.path().join("reports"),
        );
        assert!(aggregator.aggregate("energy").await.unwrap().is_none());
        assert!(!dir.path().join("reports").exists());
    }

    #[tokio::test]
    async fn failed_judgment_is_left_out_and_retried_later() {
        let dir = tempfile::tempdir().unwrap();
        let summaries = SummaryStore::new(dir.path().join("summaries"));
        summaries.save("energy", "https://good.com", "fine").await.unwrap();
        summaries.save("energy", "https://fail.com", "bad").await.unwrap();
        let aggregator =
            ReportAggregator::new(Arc::new(EchoJudge), summaries, dir.path().join("reports"));

        let judged = aggregator.judge_pending("energy").await.unwrap().unwrap();
        assert_eq!(judged.judged, 1);
        assert_eq!(judged.failed, 1);
        assert!(!aggregator.judgments_dir("energy").join("fail.com_report.md").exists());

        let again = aggregator.judge_pending("energy").await.unwrap().unwrap();
        assert_eq!(again.cached, 1);
        assert_eq!(again.failed, 1);
    }

    #[tokio::test]
    async fn empty_cached_judgment_is_requested_again() {
        let dir = tempfile::tempdir().unwrap();
        let summaries = SummaryStore::new(dir.path().join("summaries"));
        summaries.save("energy", "https://good.com", "fine").await.unwrap();
        let aggregator =
            ReportAggregator::new(Arc::new(EchoJudge), summaries, dir.path().join("reports"));
        let cached = aggregator.judgments_dir("energy").join("good.com_report.md");
        std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
        std::fs::write(&cached, "").unwrap();

        let judged = aggregator.judge_pending("energy").await.unwrap().unwrap();
        assert_eq!(judged.judged, 1);
        assert!(std::fs::read_to_string(&cached).unwrap().contains("https://good.com"));
    }

    #[tokio::test]
    async fn same_second_reports_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let summaries = SummaryStore::new(dir.path().join("summaries"));
        summaries.save("energy", "https://good.com", "fine").await.unwrap();
        let aggregator =
            ReportAggregator::new(Arc::new(EchoJudge), summaries, dir.path().join("reports"));
        let now = Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();

        let first = aggregator.aggregate_at("energy", now).await.unwrap().unwrap();
        let second = aggregator.aggregate_at("energy", now).await.unwrap().unwrap();

        assert_eq!(
            first.file_name().unwrap(),
            "energy_total_report_20240501_093000.md"
        );
        assert_eq!(
            second.file_name().unwrap(),
            "energy_total_report_20240501_093000_1.md"
        );
        assert_eq!(
            std::fs::read_to_string(&first).unwrap(),
            std::fs::read_to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn judgment_without_url_is_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let summaries = SummaryStore::new(dir.path().join("summaries"));
        std::fs::create_dir_all(dir.path().join("summaries/energy")).unwrap();
        let aggregator =
            ReportAggregator::new(Arc::new(EchoJudge), summaries, dir.path().join("reports"));
        let judgments = aggregator.judgments_dir("energy");
        std::fs::create_dir_all(&judgments).unwrap();
        std::fs::write(judgments.join("a_report.md"), "I cannot judge this source.").unwrap();
        std::fs::write(
            judgments.join("b_report.md"),
            "\"url\": \"https://b.com\"\n\"reliable\": \"No\"\n\"reason\": \"thin\"",
        )
        .unwrap();

        let path = aggregator.aggregate("energy").await.unwrap().unwrap();
        let report = std::fs::read_to_string(path).unwrap();
        assert!(report.contains("### **Selected sources (0):**"));
        assert!(report.contains("### **Rejected sources (1):**"));
        assert!(report.contains("| [b.com](https://b.com) | thin |"));
    }
}
