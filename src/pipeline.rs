//! End-to-end run: discover links, process them to exhaustion, aggregate
//! reports.

use crate::config::ScoutConfig;
use crate::dedup::DedupStore;
use crate::discovery::LinkDiscovery;
use crate::error::Result;
use crate::llm::ChatClient;
use crate::processor::{LinkProcessor, RunSummary};
use crate::progress::LinkProgress;
use crate::project::ProjectLayout;
use crate::queries::QuerySet;
use crate::raw_sources;
use crate::report::ReportAggregator;
use crate::services::{Judge, LinkSearch, PageFetch, Summarize, TitleProbe, WebLinkSearch, WebPageFetch};
use crate::summaries::SummaryStore;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Collaborators a pipeline calls out to.
#[derive(Clone)]
pub struct Services {
    /// Search-result scraping.
    pub search: Arc<dyn LinkSearch>,
    /// Page-content fetching.
    pub fetch: Arc<dyn PageFetch>,
    /// Page-title probing for raw source snapshots.
    pub titles: Arc<dyn TitleProbe>,
    /// Summarisation model call.
    pub summarizer: Arc<dyn Summarize>,
    /// Judgment model call.
    pub judge: Arc<dyn Judge>,
}

impl Services {
    /// Web scrapers and the configured LLM endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ScoutError::Config`] if the LLM client cannot be
    /// built.
    pub fn from_config(config: &ScoutConfig) -> Result<Self> {
        let fetch = Arc::new(WebPageFetch::new(config.fetch_config()));
        let titles = Arc::new(WebPageFetch::new(config.search_config()));
        let chat = Arc::new(ChatClient::from_config(&config.llm)?);
        Ok(Self {
            search: Arc::new(WebLinkSearch::new(config.search_config())),
            fetch,
            titles,
            summarizer: chat.clone(),
            judge: chat,
        })
    }
}

/// Per-industry result of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndustryReport {
    /// Link outcomes of the industry.
    pub links: RunSummary,
    /// Report written, if any.
    pub report: Option<PathBuf>,
}

/// Result of [`Pipeline::run`].
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Results keyed by industry.
    pub industries: BTreeMap<String, IndustryReport>,
    /// Link outcomes across all industries.
    pub total: RunSummary,
}

/// Wires discovery, processing and reporting together for one project.
pub struct Pipeline {
    layout: ProjectLayout,
    config: ScoutConfig,
    services: Services,
    progress: Arc<LinkProgress>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("root", &self.layout.root())
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Pipeline over `layout` calling `services`.
    pub fn new(layout: ProjectLayout, config: ScoutConfig, services: Services) -> Self {
        Self {
            layout,
            config,
            services,
            progress: Arc::new(LinkProgress::new()),
        }
    }

    /// Report link progress to `progress`.
    pub fn with_progress(mut self, progress: Arc<LinkProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Project layout.
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    fn discovery(&self) -> LinkDiscovery {
        LinkDiscovery::new(Arc::clone(&self.services.search), self.config.discovery.workers)
    }

    fn summary_store(&self) -> SummaryStore {
        SummaryStore::new(self.layout.summaries_root())
    }

    fn aggregator(&self) -> ReportAggregator {
        ReportAggregator::new(
            Arc::clone(&self.services.judge),
            self.summary_store(),
            self.layout.reports_root(),
        )
    }

    /// Discover, process and (when `report` is set) aggregate `industries`.
    ///
    /// # Errors
    ///
    /// Only configuration errors (unreadable query files) are returned;
    /// per-link and per-report failures are logged and counted.
    pub async fn run(&self, industries: &[String], report: bool) -> Result<PipelineReport> {
        let queries = QuerySet::load_all(&self.layout, industries)?;
        let links = self.discovery().collect(&queries).await;

        let dedup = Arc::new(DedupStore::load(self.layout.processed_links_path()).await);
        let processor = Arc::new(
            LinkProcessor::new(
                Arc::clone(&self.services.fetch),
                Arc::clone(&self.services.summarizer),
                dedup,
                self.summary_store(),
                self.config.processing.max_concurrent,
            )
            .with_progress(Arc::clone(&self.progress))
            .with_project_root(self.layout.root())
            .with_save_summaries(self.config.processing.save_summaries),
        );
        let batch = processor.process_batch(links).await;

        let mut result = PipelineReport {
            total: batch.summary,
            ..PipelineReport::default()
        };
        for industry in queries.industries() {
            result.industries.entry(industry.to_owned()).or_default();
        }
        for (record, outcome) in &batch.results {
            result
                .industries
                .entry(record.industry.clone())
                .or_default()
                .links
                .record(outcome);
        }

        if report {
            for (industry, entry) in &mut result.industries {
                entry.report = self.report_one(industry).await;
            }
        }

        tracing::info!(summary = %result.total, "run finished");
        Ok(result)
    }

    /// Aggregate reports for `industries` without discovering anything.
    pub async fn report(&self, industries: &[String]) -> BTreeMap<String, Option<PathBuf>> {
        let mut reports = BTreeMap::new();
        for industry in industries {
            let industry = industry.strip_suffix(".json").unwrap_or(industry);
            reports.insert(industry.to_owned(), self.report_one(industry).await);
        }
        reports
    }

    async fn report_one(&self, industry: &str) -> Option<PathBuf> {
        match self.aggregator().aggregate(industry).await {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(industry, error = %e, "report aggregation failed");
                None
            }
        }
    }

    /// Search every query, probe result titles, and write a raw source
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns configuration errors and snapshot write failures.
    pub async fn discover(&self, industries: &[String]) -> Result<PathBuf> {
        let queries = QuerySet::load_all(&self.layout, industries)?;
        let snapshot = raw_sources::collect_snapshot(
            &self.discovery(),
            Arc::clone(&self.services.titles),
            &queries,
        )
        .await;
        let path = self
            .layout
            .raw_sources_dir()
            .join(raw_sources::snapshot_file_name(chrono::Local::now()));
        raw_sources::write_snapshot(&path, snapshot).await
    }
}
