//! Configuration types for the industry-scout pipeline.

use crate::error::{Result, ScoutError};
use scout_search::{ResultWindow, SearchConfig, SearchEngine};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the project-level configuration file.
pub const CONFIG_FILE_NAME: &str = "industry-scout.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Search-result scraping settings.
    pub discovery: DiscoveryConfig,
    /// Per-link fetch and summarisation settings.
    pub processing: ProcessingConfig,
    /// Language model endpoint settings.
    pub llm: LlmConfig,
    /// Project-relative locations of inputs and artifacts.
    pub paths: PathsConfig,
}

/// Link discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Engine to scrape.
    pub engine: SearchEngine,
    /// First result position kept for every query.
    pub start: usize,
    /// First result position dropped for every query.
    pub stop: usize,
    /// Number of queries searched concurrently.
    pub workers: usize,
    /// Per-request timeout for results pages and title probes.
    pub timeout_seconds: u64,
    /// Fixed User-Agent (None = rotate through browser User-Agents).
    pub user_agent: Option<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            engine: SearchEngine::Google,
            start: 3,
            stop: 6,
            workers: 20,
            timeout_seconds: 10,
            user_agent: None,
        }
    }
}

/// Link processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Maximum number of links fetched and summarised at the same time.
    pub max_concurrent: usize,
    /// Page fetch timeout in seconds.
    pub fetch_timeout_seconds: u64,
    /// Readable text kept per page before it is sent to the model.
    pub max_content_chars: usize,
    /// Write summary artifacts to disk (and record them as processed).
    pub save_summaries: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            fetch_timeout_seconds: 10,
            max_content_chars: scout_search::content::DEFAULT_MAX_CHARS,
            save_summaries: true,
        }
    }
}

/// Language model endpoint configuration.
///
/// Any server exposing an OpenAI-compatible `/v1/chat/completions` route
/// works; the defaults target a local Ollama instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the server, without the `/v1` suffix.
    pub base_url: String,
    /// Model name passed in every request.
    pub model: String,
    /// Request timeout in seconds. Local models on CPU can be slow.
    pub timeout_seconds: u64,
    /// Sampling temperature (None = server default).
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_owned(),
            model: "llama3:instruct".to_owned(),
            timeout_seconds: 300,
            temperature: None,
        }
    }
}

/// Project-relative paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Entry whose presence marks the project root.
    pub root_marker: String,
    /// Directory holding `<industry>.json` query files.
    pub queries_dir: PathBuf,
    /// Directory holding per-industry summary artifacts.
    pub summaries_dir: PathBuf,
    /// Directory holding per-industry judgments and final reports.
    pub reports_dir: PathBuf,
    /// Directory holding raw source snapshots.
    pub raw_sources_dir: PathBuf,
    /// Directory holding rolling log files.
    pub logs_dir: PathBuf,
    /// Dedup store file.
    pub processed_links_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root_marker: ".git".to_owned(),
            queries_dir: PathBuf::from("search_queries"),
            summaries_dir: PathBuf::from("summarized_sources"),
            reports_dir: PathBuf::from("reports"),
            raw_sources_dir: PathBuf::from("raw_sources"),
            logs_dir: PathBuf::from("logs"),
            processed_links_file: PathBuf::from("summarized_sources/processed_links.json"),
        }
    }
}

impl ScoutConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScoutError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| ScoutError::Config(e.to_string()))
    }

    /// Load `path` if given, otherwise the default file under `root`.
    ///
    /// A missing default file yields defaults; a missing explicit file is an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] for unreadable or invalid files.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_config_path(root);
                if path.is_file() {
                    Self::from_file(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ScoutError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<root>/industry-scout.toml`.
    pub fn default_config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE_NAME)
    }

    /// Checks the invariants the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let d = &self.discovery;
        if d.stop <= d.start {
            return Err(ScoutError::Config(format!(
                "discovery.stop ({}) must be greater than discovery.start ({})",
                d.stop, d.start
            )));
        }
        if d.workers == 0 {
            return Err(ScoutError::Config(
                "discovery.workers must be greater than 0".into(),
            ));
        }
        if d.timeout_seconds == 0 {
            return Err(ScoutError::Config(
                "discovery.timeout_seconds must be greater than 0".into(),
            ));
        }
        let p = &self.processing;
        if p.max_concurrent == 0 {
            return Err(ScoutError::Config(
                "processing.max_concurrent must be greater than 0".into(),
            ));
        }
        if p.fetch_timeout_seconds == 0 {
            return Err(ScoutError::Config(
                "processing.fetch_timeout_seconds must be greater than 0".into(),
            ));
        }
        if p.max_content_chars == 0 {
            return Err(ScoutError::Config(
                "processing.max_content_chars must be greater than 0".into(),
            ));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(ScoutError::Config("llm.base_url must not be empty".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ScoutError::Config("llm.model must not be empty".into()));
        }
        if self.llm.timeout_seconds == 0 {
            return Err(ScoutError::Config(
                "llm.timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.paths.root_marker.trim().is_empty() {
            return Err(ScoutError::Config(
                "paths.root_marker must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Search settings for results pages and title probes.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            engine: self.discovery.engine,
            window: ResultWindow::new(self.discovery.start, self.discovery.stop),
            timeout_seconds: self.discovery.timeout_seconds,
            user_agent: self.discovery.user_agent.clone(),
            ..SearchConfig::default()
        }
    }

    /// Search settings for page-content fetches.
    pub fn fetch_config(&self) -> SearchConfig {
        SearchConfig {
            timeout_seconds: self.processing.fetch_timeout_seconds,
            max_content_chars: self.processing.max_content_chars,
            user_agent: self.discovery.user_agent.clone(),
            ..SearchConfig::default()
        }
    }
}
