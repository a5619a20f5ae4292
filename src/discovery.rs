//! Link discovery: fan queries out to a bounded pool of concurrent searches
//! and produce `(industry, url)` records.
//!
//! Records are yielded in the order searches complete, not the order
//! queries were submitted. A failed query is logged and contributes no
//! links; it never ends the stream.

use crate::error::Result;
use crate::queries::QuerySet;
use crate::services::LinkSearch;
use futures_util::{future, Stream, StreamExt};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

/// A discovered link and the industry it was found for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkRecord {
    /// Industry whose query produced the link.
    pub industry: String,
    /// Result URL.
    pub url: String,
}

impl LinkRecord {
    /// Build a record.
    pub fn new(industry: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            industry: industry.into(),
            url: url.into(),
        }
    }
}

/// Outcome of searching one query.
#[derive(Debug)]
pub struct QueryOutcome {
    /// Industry the query belongs to.
    pub industry: String,
    /// The query.
    pub query: String,
    /// Result URLs, or the search error.
    pub links: Result<Vec<String>>,
}

/// Concurrent search over a [`QuerySet`].
#[derive(Clone)]
pub struct LinkDiscovery {
    search: Arc<dyn LinkSearch>,
    workers: usize,
}

impl std::fmt::Debug for LinkDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkDiscovery")
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl LinkDiscovery {
    /// Discovery running at most `workers` searches at a time (minimum 1).
    pub fn new(search: Arc<dyn LinkSearch>, workers: usize) -> Self {
        Self {
            search,
            workers: workers.max(1),
        }
    }

    /// Search every query, yielding one [`QueryOutcome`] per query as it
    /// completes.
    pub fn search_all(&self, queries: &QuerySet) -> impl Stream<Item = QueryOutcome> + Send + use<> {
        self.search_each(queries, future::ready)
    }

    /// Search every query and run `then` on its outcome inside the same
    /// worker slot, yielding each result as it completes.
    ///
    /// At most `workers` queries are between the start of their search and
    /// the end of `then` at any time.
    pub fn search_each<F, Fut, T>(
        &self,
        queries: &QuerySet,
        then: F,
    ) -> impl Stream<Item = T> + Send + use<F, Fut, T>
    where
        F: Fn(QueryOutcome) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let jobs: Vec<(String, String)> = queries
            .pairs()
            .map(|(industry, query)| (industry.to_owned(), query.to_owned()))
            .collect();
        let search = Arc::clone(&self.search);
        let then = Arc::new(then);

        futures_util::stream::iter(jobs)
            .map(move |(industry, query)| {
                let search = Arc::clone(&search);
                let then = Arc::clone(&then);
                async move {
                    tracing::debug!(industry = %industry, query = %query, "searching");
                    let links = search.search(&query).await;
                    then(QueryOutcome {
                        industry,
                        query,
                        links,
                    })
                    .await
                }
            })
            .buffer_unordered(self.workers)
    }

    /// Lazily yield link records in completion order.
    ///
    /// Duplicate `(industry, url)` pairs within one stream are yielded once.
    pub fn stream(&self, queries: &QuerySet) -> impl Stream<Item = LinkRecord> + Send + use<> {
        let outcomes = self.search_all(queries);

        async_stream::stream! {
            let mut seen: HashSet<(String, String)> = HashSet::new();
            futures_util::pin_mut!(outcomes);
            while let Some(outcome) = outcomes.next().await {
                let links = match outcome.links {
                    Ok(links) => links,
                    Err(e) => {
                        tracing::warn!(
                            industry = %outcome.industry,
                            query = %outcome.query,
                            error = %e,
                            "search failed, query skipped"
                        );
                        continue;
                    }
                };
                tracing::info!(
                    industry = %outcome.industry,
                    query = %outcome.query,
                    links = links.len(),
                    "query searched"
                );
                for url in links {
                    if seen.insert((outcome.industry.clone(), url.clone())) {
                        yield LinkRecord::new(outcome.industry.clone(), url);
                    }
                }
            }
        }
    }

    /// Run every search to completion and return all records.
    pub async fn collect(&self, queries: &QuerySet) -> Vec<LinkRecord> {
        let records: Vec<LinkRecord> = self.stream(queries).collect().await;
        tracing::info!(
            queries = queries.total_queries(),
            links = records.len(),
            "link discovery finished"
        );
        records
    }
}
