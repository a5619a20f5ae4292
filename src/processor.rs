//! The link processor: bounded-concurrency fetch, summarise and record.
//!
//! Every link moves `Pending -> Deduped` or `Pending -> InFlight ->
//! {Succeeded, Failed}`. At most `max_concurrent` links are in flight at
//! once, across every batch this processor handles. One link failing (or
//! panicking) never stops its siblings, and every link advances the shared
//! progress counter exactly once.

use crate::dedup::DedupStore;
use crate::discovery::LinkRecord;
use crate::error::Result;
use crate::progress::{LinkProgress, LinkStatus};
use crate::services::{PageFetch, Summarize};
use crate::summaries::SummaryStore;
use futures_util::{FutureExt, Stream, StreamExt};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Terminal state of one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Already summarised in an earlier run; nothing was fetched.
    Deduped,
    /// Summarised. `path` is the artifact written, `None` when summaries
    /// are not being saved.
    Succeeded {
        /// Artifact location.
        path: Option<PathBuf>,
    },
    /// Fetch, summarisation or persistence failed.
    Failed {
        /// What went wrong.
        reason: String,
    },
}

impl LinkOutcome {
    /// Progress status for this outcome.
    pub fn status(&self) -> LinkStatus {
        match self {
            Self::Deduped => LinkStatus::Deduped,
            Self::Succeeded { .. } => LinkStatus::Succeeded,
            Self::Failed { .. } => LinkStatus::Failed,
        }
    }

    fn failed(reason: impl fmt::Display) -> Self {
        Self::Failed {
            reason: reason.to_string(),
        }
    }
}

/// Outcome counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Links that reached a terminal state.
    pub total: usize,
    /// Links skipped as already processed.
    pub deduped: usize,
    /// Links summarised.
    pub succeeded: usize,
    /// Links that failed.
    pub failed: usize,
}

impl RunSummary {
    /// Count one outcome.
    pub fn record(&mut self, outcome: &LinkOutcome) {
        self.total += 1;
        match outcome {
            LinkOutcome::Deduped => self.deduped += 1,
            LinkOutcome::Succeeded { .. } => self.succeeded += 1,
            LinkOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Add another summary's counts.
    pub fn merge(&mut self, other: &RunSummary) {
        self.total += other.total;
        self.deduped += other.deduped;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} links: {} summarised, {} already processed, {} failed",
            self.total, self.succeeded, self.deduped, self.failed
        )
    }
}

/// Every link of a batch with its outcome, plus the counts.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// `(link, outcome)` in completion order.
    pub results: Vec<(LinkRecord, LinkOutcome)>,
    /// Counts over `results`.
    pub summary: RunSummary,
}

impl BatchOutcome {
    fn push(&mut self, record: LinkRecord, outcome: LinkOutcome) {
        self.summary.record(&outcome);
        self.results.push((record, outcome));
    }

    /// Outcome of `url` under `industry`, if it was part of the batch.
    pub fn outcome(&self, industry: &str, url: &str) -> Option<&LinkOutcome> {
        self.results
            .iter()
            .find(|(r, _)| r.industry == industry && r.url == url)
            .map(|(_, outcome)| outcome)
    }
}

/// Fetches, summarises and records discovered links.
pub struct LinkProcessor {
    fetch: Arc<dyn PageFetch>,
    summarizer: Arc<dyn Summarize>,
    dedup: Arc<DedupStore>,
    summaries: SummaryStore,
    gate: Arc<Semaphore>,
    progress: Arc<LinkProgress>,
    project_root: Option<PathBuf>,
    save_summaries: bool,
}

impl fmt::Debug for LinkProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkProcessor")
            .field("available_slots", &self.gate.available_permits())
            .field("summaries", &self.summaries)
            .field("save_summaries", &self.save_summaries)
            .finish_non_exhaustive()
    }
}

impl LinkProcessor {
    /// Processor admitting at most `max_concurrent` links at once
    /// (minimum 1).
    pub fn new(
        fetch: Arc<dyn PageFetch>,
        summarizer: Arc<dyn Summarize>,
        dedup: Arc<DedupStore>,
        summaries: SummaryStore,
        max_concurrent: usize,
    ) -> Self {
        Self {
            fetch,
            summarizer,
            dedup,
            summaries,
            gate: Arc::new(Semaphore::new(max_concurrent.max(1))),
            progress: Arc::new(LinkProgress::new()),
            project_root: None,
            save_summaries: true,
        }
    }

    /// Report progress to `progress` instead of a private counter.
    pub fn with_progress(mut self, progress: Arc<LinkProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Record artifact paths relative to `root` in the dedup store.
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Whether summaries are written and recorded (default `true`).
    pub fn with_save_summaries(mut self, save: bool) -> Self {
        self.save_summaries = save;
        self
    }

    /// Shared progress counter.
    pub fn progress(&self) -> &Arc<LinkProgress> {
        &self.progress
    }

    /// Dedup store consulted before every link.
    pub fn dedup(&self) -> &Arc<DedupStore> {
        &self.dedup
    }

    /// Drive one link to a terminal state.
    pub async fn process(&self, record: &LinkRecord) -> LinkOutcome {
        let ticket = self.progress.begin(&record.industry, &record.url);
        let outcome = self.run(record).await;
        match &outcome {
            LinkOutcome::Deduped => {
                tracing::debug!(industry = %record.industry, url = %record.url, "link already processed");
            }
            LinkOutcome::Succeeded { .. } => {
                tracing::info!(industry = %record.industry, url = %record.url, "link summarised");
            }
            LinkOutcome::Failed { reason } => {
                tracing::warn!(industry = %record.industry, url = %record.url, reason = %reason, "link failed");
            }
        }
        ticket.finish(outcome.status());
        outcome
    }

    async fn run(&self, record: &LinkRecord) -> LinkOutcome {
        let LinkRecord { industry, url } = record;
        if self.dedup.contains(industry, url).await {
            return LinkOutcome::Deduped;
        }

        let _permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            Err(e) => return LinkOutcome::failed(format!("admission gate closed: {e}")),
        };

        // A sibling holding the same link may have finished while we waited.
        if self.dedup.contains(industry, url).await {
            return LinkOutcome::Deduped;
        }

        let content = match self.fetch.fetch(url).await {
            Ok(content) => content,
            Err(e) => return LinkOutcome::failed(e),
        };

        let summary = match self.summarizer.summarize(&content, industry).await {
            Ok(summary) => summary,
            Err(e) => return LinkOutcome::failed(e),
        };

        if !self.save_summaries {
            return LinkOutcome::Succeeded { path: None };
        }
        match self.persist(industry, url, &summary).await {
            Ok(path) => LinkOutcome::Succeeded { path: Some(path) },
            Err(e) => LinkOutcome::failed(e),
        }
    }

    async fn persist(&self, industry: &str, url: &str, summary: &str) -> Result<PathBuf> {
        let path = self.summaries.save(industry, url, summary).await?;
        let location = self.relative(&path);
        self.dedup.record(industry, url, &location).await?;
        Ok(path)
    }

    fn relative(&self, path: &Path) -> PathBuf {
        match &self.project_root {
            Some(root) => path
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.to_path_buf()),
            None => path.to_path_buf(),
        }
    }

    /// Process every link concurrently on the current runtime and wait for
    /// all of them.
    pub async fn process_batch(self: &Arc<Self>, links: Vec<LinkRecord>) -> BatchOutcome {
        self.progress.plan(links.len());
        let mut tasks = JoinSet::new();
        for record in links {
            self.spawn(&mut tasks, record);
        }
        let outcome = drain(tasks).await;
        tracing::info!(summary = %outcome.summary, "batch processed");
        outcome
    }

    /// Process links as `links` yields them, then wait for all of them.
    pub async fn process_stream<S>(self: &Arc<Self>, links: S) -> BatchOutcome
    where
        S: Stream<Item = LinkRecord>,
    {
        let mut tasks = JoinSet::new();
        futures_util::pin_mut!(links);
        while let Some(record) = links.next().await {
            self.spawn(&mut tasks, record);
        }
        let outcome = drain(tasks).await;
        tracing::info!(summary = %outcome.summary, "stream processed");
        outcome
    }

    fn spawn(self: &Arc<Self>, tasks: &mut JoinSet<(LinkRecord, LinkOutcome)>, record: LinkRecord) {
        let processor = Arc::clone(self);
        tasks.spawn(async move {
            let outcome = match AssertUnwindSafe(processor.process(&record))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(panic) => LinkOutcome::failed(panic_message(&*panic)),
            };
            (record, outcome)
        });
    }
}

async fn drain(mut tasks: JoinSet<(LinkRecord, LinkOutcome)>) -> BatchOutcome {
    let mut batch = BatchOutcome::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((record, outcome)) => batch.push(record, outcome),
            Err(e) => {
                tracing::error!(error = %e, "link task did not complete");
                batch.summary.record(&LinkOutcome::failed(e));
            }
        }
    }
    batch
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned());
    format!("link task panicked: {detail}")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticFetch;

    #[async_trait]
    impl PageFetch for StaticFetch {
        async fn fetch(&self, url: &str) -> Result<String> {
            Ok(format!("content of {url}"))
        }
    }

    #[derive(Default)]
    struct CountingSummarizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Summarize for CountingSummarizer {
        async fn summarize(&self, content: &str, industry: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{industry}: {content}"))
        }
    }

    async fn processor(
        dir: &Path,
        summarizer: Arc<CountingSummarizer>,
    ) -> Arc<LinkProcessor> {
        let dedup = Arc::new(DedupStore::load(dir.join("processed_links.json")).await);
        Arc::new(
            LinkProcessor::new(
                Arc::new(StaticFetch),
                summarizer,
                dedup,
                SummaryStore::new(dir.join("summaries")),
                2,
            )
            .with_project_root(dir),
        )
    }

    #[tokio::test]
    async fn success_writes_summary_and_relative_dedup_entry() {
        let dir = tempfile::tempdir().unwrap();
        let summarizer = Arc::new(CountingSummarizer::default());
        let processor = processor(dir.path(), summarizer.clone()).await;

        let record = LinkRecord::new("energy", "https://www.iea.org/x");
        let outcome = processor.process(&record).await;

        let expected = dir.path().join("summaries/energy/iea.org.md");
        assert_eq!(
            outcome,
            LinkOutcome::Succeeded {
                path: Some(expected.clone())
            }
        );
        assert_eq!(
            std::fs::read_to_string(&expected).unwrap(),
            "URL: https://www.iea.org/x\n\nenergy: content of https://www.iea.org/x"
        );
        assert_eq!(
            processor.dedup().location("energy", "https://www.iea.org/x").await.as_deref(),
            Some("summaries/energy/iea.org.md")
        );
        assert_eq!(processor.progress().completed(), 1);
    }

    #[tokio::test]
    async fn second_call_is_deduped() {
        let dir = tempfile::tempdir().unwrap();
        let summarizer = Arc::new(CountingSummarizer::default());
        let processor = processor(dir.path(), summarizer.clone()).await;
        let record = LinkRecord::new("energy", "https://a.com");

        processor.process(&record).await;
        assert_eq!(processor.process(&record).await, LinkOutcome::Deduped);
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(processor.progress().completed(), 2);
    }

    #[tokio::test]
    async fn unsaved_summaries_are_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let summarizer = Arc::new(CountingSummarizer::default());
        let dedup = Arc::new(DedupStore::load(dir.path().join("p.json")).await);
        let processor = LinkProcessor::new(
            Arc::new(StaticFetch),
            summarizer,
            dedup.clone(),
            SummaryStore::new(dir.path().join("s")),
            1,
        )
        .with_save_summaries(false);

        let outcome = processor.process(&LinkRecord::new("a", "https://a.com")).await;
        assert_eq!(outcome, LinkOutcome::Succeeded { path: None });
        assert!(dedup.is_empty().await);
        assert!(!dir.path().join("s").exists());
    }

    #[test]
    fn run_summary_counts() {
        let mut summary = RunSummary::default();
        summary.record(&LinkOutcome::Deduped);
        summary.record(&LinkOutcome::Succeeded { path: None });
        summary.record(&LinkOutcome::failed("x"));
        summary.record(&LinkOutcome::failed("y"));
        assert_eq!(
            summary,
            RunSummary {
                total: 4,
                deduped: 1,
                succeeded: 1,
                failed: 2
            }
        );
        assert_eq!(
            summary.to_string(),
            "4 links: 1 summarised, 1 already processed, 2 failed"
        );

        let mut total = RunSummary::default();
        total.merge(&summary);
        total.merge(&summary);
        assert_eq!(total.total, 8);
    }

    #[test]
    fn panic_messages() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert!(panic_message(&*boxed).contains("boom"));
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert!(panic_message(&*boxed).contains("bang"));
        let boxed: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert!(panic_message(&*boxed).contains("unknown panic"));
    }
}
