//! arXiv Atom API client.
//!
//! Endpoint: http://export.arxiv.org/api/query

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use tracing::{debug, instrument};

use super::{search_http_client, status_error, LiteratureSource};
use crate::error::SourceError;
use crate::paper::{collapse_whitespace, truncate_chars, PaperRecord, Source};

/// arXiv search client.
pub struct ArxivClient {
    client: Client,
    base_url: String,
}

impl ArxivClient {
    /// Create a client that queries `base_url`, normally `Endpoints::arxiv`.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            client: search_http_client()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl LiteratureSource for ArxivClient {
    fn source(&self) -> Source {
        Source::Arxiv
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<PaperRecord>, SourceError> {
        let max_results = max_results.to_string();
        let params = [
            ("search_query", query),
            ("start", "0"),
            ("max_results", max_results.as_str()),
            ("sortBy", "submittedDate"),
            ("sortOrder", "descending"),
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

        let xml = response.text().await?;
        let papers = parse_atom_feed(&xml)?;
        debug!(count = papers.len(), bytes = xml.len(), "arXiv feed parsed");
        Ok(papers)
    }
}

/// Which entry child element the next text event belongs to.
#[derive(Debug, Clone, Copy)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

/// Accumulates one `<entry>` while the feed is being read.
#[derive(Debug, Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    published: String,
    authors: Vec<String>,
    categories: Vec<String>,
    in_author: bool,
}

impl EntryBuilder {
    fn push_text(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Id => &mut self.id,
            Field::Title => &mut self.title,
            Field::Summary => &mut self.summary,
            Field::Published => &mut self.published,
            Field::AuthorName => {
                if let Some(last) = self.authors.last_mut() {
                    last.push_str(text);
                }
                return;
            }
        };
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(text);
    }

    fn push_category(&mut self, element: &BytesStart<'_>) {
        for attr in element.attributes().flatten() {
            if attr.key.local_name().as_ref() == b"term" {
                self.categories
                    .push(String::from_utf8_lossy(&attr.value).into_owned());
            }
        }
    }

    fn finish(self) -> Option<PaperRecord> {
        let title = collapse_whitespace(&self.title);
        if title.is_empty() {
            return None;
        }

        let authors = self
            .authors
            .into_iter()
            .map(|a| collapse_whitespace(&a))
            .filter(|a| !a.is_empty())
            .collect();

        Some(
            PaperRecord::new(
                Source::Arxiv,
                title,
                &collapse_whitespace(&self.summary),
                truncate_chars(self.published.trim(), 10),
                self.id.trim(),
                authors,
            )
            .with_categories(self.categories),
        )
    }
}

/// Parse an arXiv Atom feed into paper records.
///
/// Entries without a title are dropped.
pub fn parse_atom_feed(xml: &str) -> Result<Vec<PaperRecord>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut papers = Vec::new();
    let mut entry: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let Some(current) = entry.as_mut() else {
                    if e.local_name().as_ref() == b"entry" {
                        entry = Some(EntryBuilder::default());
                    }
                    continue;
                };
                match e.local_name().as_ref() {
                    b"id" => field = Some(Field::Id),
                    b"title" => field = Some(Field::Title),
                    b"summary" => field = Some(Field::Summary),
                    b"published" => field = Some(Field::Published),
                    b"author" => current.in_author = true,
                    b"name" if current.in_author => {
                        current.authors.push(String::new());
                        field = Some(Field::AuthorName);
                    }
                    b"category" => current.push_category(&e),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if let Some(current) = entry.as_mut() {
                    if e.local_name().as_ref() == b"category" {
                        current.push_category(&e);
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    let text = t.unescape().unwrap_or_default();
                    current.push_text(f, &text);
                }
            }
            Event::CData(c) => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    current.push_text(f, &String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"entry" => {
                    field = None;
                    if let Some(record) = entry.take().and_then(EntryBuilder::finish) {
                        papers.push(record);
                    } else {
                        debug!("Skipping arXiv entry without a title");
                    }
                }
                b"author" => {
                    if let Some(current) = entry.as_mut() {
                        current.in_author = false;
                    }
                }
                _ => field = None,
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(papers)
}
