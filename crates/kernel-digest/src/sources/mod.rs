//! Literature source clients.
//!
//! Each client issues one HTTP request per query and normalizes the
//! response into [`PaperRecord`]s. Clients report failures as
//! [`SourceError`]; [`search_all`] turns those into empty result sets so a
//! single bad query never sinks the run.

pub mod arxiv;
pub mod semantic_scholar;

pub use arxiv::ArxivClient;
pub use semantic_scholar::SemanticScholarClient;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::SourceError;
use crate::paper::{PaperRecord, Source};

/// User agent sent with every search request.
pub const USER_AGENT: &str = "KernelDigest/1.0";

/// Timeout applied to each search request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Common interface for all literature source clients.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    /// Which service this client talks to.
    fn source(&self) -> Source;

    /// Search for papers matching a query, returning at most `max_results`.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<PaperRecord>, SourceError>;
}

/// Shared HTTP client configuration for search requests.
pub(crate) fn search_http_client() -> Result<Client, SourceError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Read the body of a non-success response into a [`SourceError::Status`].
pub(crate) async fn status_error(response: reqwest::Response) -> SourceError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".into());
    SourceError::Status {
        status,
        message: crate::paper::truncate_chars(message.trim(), 200),
    }
}

/// Run one query, logging and swallowing any failure.
pub async fn search_or_empty(
    source: &dyn LiteratureSource,
    query: &str,
    max_results: usize,
) -> Vec<PaperRecord> {
    match source.search(query, max_results).await {
        Ok(papers) => papers,
        Err(e) => {
            warn!(source = %source.source(), query, error = %e, "Search failed, treating as no results");
            Vec::new()
        }
    }
}

/// Run every query against `source` in order and concatenate the results.
pub async fn search_all(
    source: &dyn LiteratureSource,
    queries: &[String],
    max_results: usize,
) -> Vec<PaperRecord> {
    let mut papers = Vec::new();
    for query in queries {
        let found = search_or_empty(source, query, max_results).await;
        info!(
            source = %source.source(),
            query = %preview_query(query),
            count = found.len(),
            "Query complete"
        );
        papers.extend(found);
    }
    papers
}

/// Shorten long query expressions for log lines.
fn preview_query(query: &str) -> String {
    const MAX_CHARS: usize = 50;

    if query.chars().count() <= MAX_CHARS {
        query.to_string()
    } else {
        let truncated: String = query.chars().take(MAX_CHARS).collect();
        format!("{truncated}...")
    }
}
