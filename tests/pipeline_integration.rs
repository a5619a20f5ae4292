//! Full runs over a temporary project directory with in-memory services.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use industry_scout::services::{Judge, LinkSearch, PageFetch, Summarize, TitleProbe};
use industry_scout::{LinkProgress, Pipeline, ProjectLayout, Result, ScoutConfig, ScoutError, Services};
use scout_search::{PageTitle, SearchError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct TableSearch {
    results: HashMap<String, Vec<String>>,
}

#[async_trait]
impl LinkSearch for TableSearch {
    async fn search(&self, query: &str) -> Result<Vec<String>> {
        self.results
            .get(query)
            .cloned()
            .ok_or_else(|| ScoutError::Search(SearchError::Status(429)))
    }
}

#[derive(Default)]
struct Offline {
    fetches: AtomicUsize,
    summaries: AtomicUsize,
    judgments: AtomicUsize,
}

#[async_trait]
impl PageFetch for Offline {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Body of {url}"))
    }
}

#[async_trait]
impl Summarize for Offline {
    async fn summarize(&self, content: &str, industry: &str) -> Result<String> {
        self.summaries.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{industry} summary. {content}"))
    }
}

#[async_trait]
impl Judge for Offline {
    async fn judge(&self, summary: &str, _industry: &str, _template: &str) -> Result<String> {
        self.judgments.fetch_add(1, Ordering::SeqCst);
        let url = summary
            .lines()
            .next()
            .and_then(|l| l.strip_prefix("URL: "))
            .unwrap_or_default();
        let reliable = if url.contains(".gov") { "Yes" } else { "No" };
        Ok(format!(
            "{{\"url\": \"{url}\",\n\"reliable\": \"{reliable}\",\n\"reason\": \"checked\"}}"
        ))
    }
}

#[async_trait]
impl TitleProbe for Offline {
    async fn probe(&self, url: &str) -> Result<PageTitle> {
        if url.contains("dead") {
            return Err(ScoutError::Search(SearchError::Timeout(url.to_owned())));
        }
        Ok(PageTitle {
            link: url.to_owned(),
            title: format!("Title of {url}"),
        })
    }
}

fn services(offline: &Arc<Offline>) -> Services {
    let results = HashMap::from([
        (
            "energy statistics".to_owned(),
            vec!["https://www.eia.gov/data".to_owned(), "https://blog.example.com/energy".to_owned()],
        ),
        (
            "energy regulators".to_owned(),
            vec!["https://www.eia.gov/data".to_owned(), "https://dead.example.net/".to_owned()],
        ),
        ("retail footfall".to_owned(), vec!["https://census.gov/retail".to_owned()]),
    ]);
    Services {
        search: Arc::new(TableSearch { results }),
        fetch: offline.clone(),
        titles: offline.clone(),
        summarizer: offline.clone(),
        judge: offline.clone(),
    }
}

fn project(root: &Path) -> ProjectLayout {
    let queries = root.join("search_queries");
    std::fs::create_dir_all(&queries).unwrap();
    std::fs::write(
        queries.join("energy.json"),
        r#"{"energy": ["energy statistics", "energy regulators", "energy outage"]}"#,
    )
    .unwrap();
    std::fs::write(queries.join("retail.json"), r#"{"retail": ["retail footfall"]}"#).unwrap();
    ProjectLayout::at(root, ScoutConfig::default().paths).unwrap()
}

fn industries(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_owned()).collect()
}

#[tokio::test]
async fn run_summarises_records_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let offline = Arc::new(Offline::default());
    let progress = Arc::new(LinkProgress::new());
    let pipeline = Pipeline::new(project(dir.path()), ScoutConfig::default(), services(&offline))
        .with_progress(progress.clone());

    let result = pipeline
        .run(&industries(&["energy", "retail.json"]), true)
        .await
        .unwrap();

    // eia.gov appears under two energy queries but is processed once.
    assert_eq!(result.total.total, 4);
    assert_eq!(result.total.succeeded, 4);
    assert_eq!(progress.completed(), 4);
    assert_eq!(offline.summaries.load(Ordering::SeqCst), 4);
    assert_eq!(result.industries["energy"].links.succeeded, 3);
    assert_eq!(result.industries["retail"].links.succeeded, 1);

    let summaries = dir.path().join("summarized_sources");
    assert!(summaries.join("energy/eia.gov.md").is_file());
    assert!(summaries.join("energy/blog.example.com.md").is_file());
    assert!(summaries.join("energy/dead.example.net.md").is_file());
    assert!(summaries.join("retail/census.gov.md").is_file());

    let processed: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(summaries.join("processed_links.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        processed["energy"]["https://www.eia.gov/data"],
        "summarized_sources/energy/eia.gov.md"
    );
    assert_eq!(
        processed["retail"]["https://census.gov/retail"],
        "summarized_sources/retail/census.gov.md"
    );

    let report = result.industries["energy"].report.clone().expect("energy report");
    assert!(report.starts_with(dir.path().join("reports/energy")));
    let text = std::fs::read_to_string(report).unwrap();
    assert!(text.contains("in the Energy industry"));
    assert!(text.contains("### **Selected sources (1):**"));
    assert!(text.contains("| [eia.gov](https://www.eia.gov/data) | checked |"));
    assert!(text.contains("### **Rejected sources (2):**"));
    assert!(result.industries["retail"].report.is_some());
}

#[tokio::test]
async fn second_run_dedups_every_link() {
    let dir = tempfile::tempdir().unwrap();
    let layout = project(dir.path());
    let offline = Arc::new(Offline::default());
    let energy = industries(&["energy"]);

    Pipeline::new(layout.clone(), ScoutConfig::default(), services(&offline))
        .run(&energy, false)
        .await
        .unwrap();
    assert_eq!(offline.fetches.load(Ordering::SeqCst), 3);

    let rerun = Arc::new(Offline::default());
    let result = Pipeline::new(layout, ScoutConfig::default(), services(&rerun))
        .run(&energy, false)
        .await
        .unwrap();
    assert_eq!(result.total.deduped, 3);
    assert_eq!(result.total.succeeded, 0);
    assert_eq!(rerun.fetches.load(Ordering::SeqCst), 0);
    assert_eq!(rerun.summaries.load(Ordering::SeqCst), 0);
    assert_eq!(result.industries["energy"].report, None);
}

#[tokio::test]
async fn report_command_judges_without_searching() {
    let dir = tempfile::tempdir().unwrap();
    let layout = project(dir.path());
    let offline = Arc::new(Offline::default());
    Pipeline::new(layout.clone(), ScoutConfig::default(), services(&offline))
        .run(&industries(&["retail"]), false)
        .await
        .unwrap();
    assert_eq!(offline.judgments.load(Ordering::SeqCst), 0);

    let pipeline = Pipeline::new(layout, ScoutConfig::default(), services(&offline));
    let reports = pipeline.report(&industries(&["retail.json", "mining"])).await;
    assert!(reports["retail"].is_some());
    assert_eq!(reports["mining"], None);
    assert_eq!(offline.judgments.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn disabled_summary_saving_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ScoutConfig::default();
    config.processing.save_summaries = false;
    let offline = Arc::new(Offline::default());
    let pipeline = Pipeline::new(project(dir.path()), config, services(&offline));

    let result = pipeline.run(&industries(&["retail"]), false).await.unwrap();
    assert_eq!(result.total.succeeded, 1);
    assert!(!dir.path().join("summarized_sources/retail/census.gov.md").exists());
    assert!(!dir.path().join("summarized_sources/processed_links.json").exists());
}

#[tokio::test]
async fn missing_query_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let offline = Arc::new(Offline::default());
    let pipeline = Pipeline::new(project(dir.path()), ScoutConfig::default(), services(&offline));

    let err = pipeline
        .run(&industries(&["energy", "aerospace"]), true)
        .await
        .unwrap_err();
    assert!(matches!(err, ScoutError::QueryFile(_)));
    assert!(err.is_fatal());
    assert_eq!(offline.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn discover_writes_titled_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let offline = Arc::new(Offline::default());
    let pipeline = Pipeline::new(project(dir.path()), ScoutConfig::default(), services(&offline));

    let path = pipeline.discover(&industries(&["energy"])).await.unwrap();
    assert!(path.starts_with(dir.path().join("raw_sources")));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("raw_sources_") && name.ends_with(".json"));

    let snapshot: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let energy = &snapshot["energy"];
    assert_eq!(
        energy["energy statistics"][0],
        serde_json::json!({"link": "https://www.eia.gov/data", "title": "Title of https://www.eia.gov/data"})
    );
    assert_eq!(energy["energy regulators"][1]["link"], "https://dead.example.net/");
    assert!(energy["energy regulators"][1]["error"].is_string());
    assert!(energy.get("energy outage").is_none());

    // Discovery never summarises.
    assert_eq!(offline.summaries.load(Ordering::SeqCst), 0);
    assert!(!dir.path().join("summarized_sources").exists());
}
