//! Query sets: industry name to search queries, loaded from JSON files.

use crate::error::{Result, ScoutError};
use crate::project::ProjectLayout;
use std::collections::BTreeMap;

/// Immutable mapping of industry to its ordered search queries.
///
/// Industries iterate in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySet {
    queries: BTreeMap<String, Vec<String>>,
}

impl QuerySet {
    /// Load `<queries_dir>/<industry>.json`.
    ///
    /// The file has the shape `{"<industry>": ["query", ...]}` and may name
    /// more than one industry.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::QueryFile`] when the file is missing or is not
    /// a JSON object of string arrays.
    pub fn load(layout: &ProjectLayout, industry: &str) -> Result<Self> {
        let path = layout.queries_file(industry);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ScoutError::QueryFile(format!("cannot read {}: {e}", path.display()))
        })?;
        let queries: BTreeMap<String, Vec<String>> = serde_json::from_str(&content)
            .map_err(|e| ScoutError::QueryFile(format!("{}: {e}", path.display())))?;

        let set = Self { queries };
        tracing::info!(
            file = %path.display(),
            industries = set.queries.len(),
            queries = set.total_queries(),
            "query set loaded"
        );
        Ok(set)
    }

    /// Load and merge several industry files.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be loaded.
    pub fn load_all(layout: &ProjectLayout, industries: &[String]) -> Result<Self> {
        let mut merged = Self::default();
        for industry in industries {
            let set = Self::load(layout, industry)?;
            merged.queries.extend(set.queries);
        }
        Ok(merged)
    }

    /// Industry names, sorted.
    pub fn industries(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }

    /// Queries of one industry, empty if unknown.
    pub fn queries(&self, industry: &str) -> &[String] {
        self.queries.get(industry).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(industry, query)` pairs in industry order, then file order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.queries.iter().flat_map(|(industry, queries)| {
            queries
                .iter()
                .map(move |query| (industry.as_str(), query.as_str()))
        })
    }

    /// Number of queries across all industries.
    pub fn total_queries(&self) -> usize {
        self.queries.values().map(Vec::len).sum()
    }

    /// `true` when no industry has any query.
    pub fn is_empty(&self) -> bool {
        self.total_queries() == 0
    }
}

impl FromIterator<(String, Vec<String>)> for QuerySet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            queries: iter.into_iter().collect(),
        }
    }
}
