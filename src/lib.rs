//! industry-scout: find, summarise and judge information sources per
//! industry.
//!
//! A run flows through:
//! search queries → link discovery → link processing → report aggregation
//!
//! # Architecture
//!
//! - **Link discovery**: searches every query of a [`QuerySet`] on a bounded
//!   pool of concurrent requests and yields `(industry, url)` records
//! - **Link processing**: fetches and summarises each new link with at most
//!   N in flight, skipping links already in the [`DedupStore`]
//! - **Report aggregation**: judges every summary once and writes a
//!   timestamped selected/rejected report
//!
//! Search scraping and page extraction live in the `scout-search` crate;
//! every remote call is behind a trait in [`services`] so tests can inject
//! fakes.

pub mod config;
pub mod dedup;
pub mod discovery;
pub mod error;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod processor;
pub mod progress;
pub mod project;
pub mod prompts;
pub mod queries;
pub mod raw_sources;
pub mod report;
pub mod services;
pub mod summaries;

pub use config::ScoutConfig;
pub use dedup::DedupStore;
pub use discovery::{LinkDiscovery, LinkRecord};
pub use error::{Result, ScoutError};
pub use pipeline::{Pipeline, PipelineReport, Services};
pub use processor::{LinkOutcome, LinkProcessor, RunSummary};
pub use progress::{LinkProgress, ProgressCallback, ProgressEvent};
pub use project::ProjectLayout;
pub use queries::QuerySet;
pub use report::ReportAggregator;
pub use summaries::SummaryStore;
