//! Semantic Scholar Graph API client.
//!
//! Endpoint: https://api.semanticscholar.org/graph/v1/paper/search

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{search_http_client, status_error, LiteratureSource};
use crate::error::SourceError;
use crate::paper::{PaperRecord, Source, MAX_AUTHORS, UNKNOWN_DATE};

/// Fields requested for every search result.
pub const SEARCH_FIELDS: &str = "title,abstract,url,year,authors,publicationDate,venue";

/// Semantic Scholar search client.
pub struct SemanticScholarClient {
    client: Client,
    base_url: String,
    year_range: String,
}

impl SemanticScholarClient {
    /// Create a client that queries `base_url`, filtering by `year_range`
    /// (e.g. `2025-2026`).
    pub fn with_base_url(
        base_url: impl Into<String>,
        year_range: impl Into<String>,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: search_http_client()?,
            base_url: base_url.into(),
            year_range: year_range.into(),
        })
    }
}

/// Top-level search response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Option<Vec<ApiPaper>>,
}

/// One search hit. Every field may be null.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPaper {
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    url: Option<String>,
    year: Option<i64>,
    authors: Option<Vec<ApiAuthor>>,
    publication_date: Option<String>,
    venue: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiAuthor {
    name: Option<String>,
}

impl ApiPaper {
    /// Normalize into a record; `None` when the hit has no title.
    fn into_record(self) -> Option<PaperRecord> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;

        let published = self
            .publication_date
            .filter(|d| !d.trim().is_empty())
            .or_else(|| self.year.map(|y| y.to_string()))
            .unwrap_or_else(|| UNKNOWN_DATE.to_string());

        let authors = self
            .authors
            .unwrap_or_default()
            .into_iter()
            .take(MAX_AUTHORS)
            .map(|a| a.name.unwrap_or_default())
            .collect();

        Some(
            PaperRecord::new(
                Source::SemanticScholar,
                title,
                self.abstract_text.as_deref().unwrap_or(""),
                published,
                self.url.unwrap_or_default(),
                authors,
            )
            .with_venue(self.venue),
        )
    }
}

/// Parse a search response body into paper records.
pub fn parse_search_response(body: &str) -> Result<Vec<PaperRecord>, SourceError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .data
        .unwrap_or_default()
        .into_iter()
        .filter_map(ApiPaper::into_record)
        .collect())
}

#[async_trait]
impl LiteratureSource for SemanticScholarClient {
    fn source(&self) -> Source {
        Source::SemanticScholar
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<PaperRecord>, SourceError> {
        let limit = max_results.to_string();
        let params = [
            ("query", query),
            ("limit", limit.as_str()),
            ("fields", SEARCH_FIELDS),
            ("year", self.year_range.as_str()),
        ];

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body = response.text().await?;
        let papers = parse_search_response(&body)?;
        debug!(count = papers.len(), "Semantic Scholar search returned results");
        Ok(papers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_result() {
        let body = r#"{
            "total": 1,
            "data": [{
                "paperId": "abc",
                "title": "Automated Kernel Generation with LLMs",
                "abstract": "We generate CUDA kernels.",
                "url": "https://www.semanticscholar.org/paper/abc",
                "year": 2025,
                "publicationDate": "2025-10-14",
                "venue": "MLSys",
                "authors": [{"authorId": "1", "name": "Grace Hopper"}]
            }]
        }"#;

        let papers = parse_search_response(body).unwrap();
        assert_eq!(papers.len(), 1);
        let p = &papers[0];
        assert_eq!(p.title(), "Automated Kernel Generation with LLMs");
        assert_eq!(p.summary(), "We generate CUDA kernels.");
        assert_eq!(p.published(), "2025-10-14");
        assert_eq!(p.venue(), Some("MLSys"));
        assert_eq!(p.authors(), ["Grace Hopper"]);
        assert_eq!(p.source(), Source::SemanticScholar);
        assert!(p.categories().is_empty());
    }

    #[test]
    fn test_skips_results_without_title() {
        let body = r#"{"data": [{"title": null}, {"title": ""}, {"title": "Kept"}]}"#;
        let papers = parse_search_response(body).unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title(), "Kept");
    }

    #[test]
    fn test_published_falls_back_to_year_then_unknown() {
        let body = r#"{"data": [
            {"title": "Year only", "year": 2025, "publicationDate": null},
            {"title": "Nothing"}
        ]}"#;
        let papers = parse_search_response(body).unwrap();
        assert_eq!(papers[0].published(), "2025");
        assert!(papers[1].has_unknown_date());
    }

    #[test]
    fn test_missing_abstract_and_url_become_empty() {
        let body = r#"{"data": [{"title": "Bare", "abstract": null, "authors": null, "venue": ""}]}"#;
        let papers = parse_search_response(body).unwrap();
        assert_eq!(papers[0].summary(), "");
        assert_eq!(papers[0].url(), "");
        assert!(papers[0].authors().is_empty());
        assert_eq!(papers[0].venue(), None);
    }

    #[test]
    fn test_authors_capped_and_nameless_kept_empty() {
        let body = r#"{"data": [{"title": "Many", "authors": [
            {"name": "A"}, {"name": null}, {"name": "C"}, {"name": "D"},
            {"name": "E"}, {"name": "F"}
        ]}]}"#;
        let papers = parse_search_response(body).unwrap();
        assert_eq!(papers[0].authors(), ["A", "", "C", "D", "E"]);
    }

    #[test]
    fn test_missing_data_is_empty() {
        let papers = parse_search_response(r#"{"total": 0}"#).unwrap();
        assert!(papers.is_empty());

        let papers = parse_search_response(r#"{"total": 0, "data": null}"#).unwrap();
        assert!(papers.is_empty());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            parse_search_response("<html>"),
            Err(SourceError::Json(_))
        ));
    }
}
