//! Paper records shared by every stage of the digest.

use std::fmt;

/// Summaries are cut to this many characters when a record is built.
pub const MAX_SUMMARY_CHARS: usize = 500;

/// Only the first few authors are kept per paper.
pub const MAX_AUTHORS: usize = 5;

/// Sentinel used when a source cannot supply a publication date.
pub const UNKNOWN_DATE: &str = "unknown";

/// Which search service produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// arXiv Atom API.
    Arxiv,
    /// Semantic Scholar Graph API.
    SemanticScholar,
}

impl Source {
    /// Human-readable label used in the digest badge.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Source::Arxiv => "arXiv",
            Source::SemanticScholar => "Semantic Scholar",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A normalized paper as returned by a source client.
///
/// Fields are private: once built, a record is read-only. The relevance
/// score lives in [`ScoredPaper`] instead of on the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRecord {
    title: String,
    summary: String,
    published: String,
    url: String,
    authors: Vec<String>,
    source: Source,
    venue: Option<String>,
    categories: Vec<String>,
}

impl PaperRecord {
    /// Build a record, truncating the summary and capping the author list.
    ///
    /// An empty `published` string is stored as [`UNKNOWN_DATE`].
    #[must_use]
    pub fn new(
        source: Source,
        title: impl Into<String>,
        summary: &str,
        published: impl Into<String>,
        url: impl Into<String>,
        authors: Vec<String>,
    ) -> Self {
        let published = published.into();
        let mut authors = authors;
        authors.truncate(MAX_AUTHORS);

        Self {
            title: title.into(),
            summary: truncate_chars(summary, MAX_SUMMARY_CHARS),
            published: if published.trim().is_empty() {
                UNKNOWN_DATE.to_string()
            } else {
                published
            },
            url: url.into(),
            authors,
            source,
            venue: None,
            categories: Vec::new(),
        }
    }

    /// Attach a publication venue. Blank venues are ignored.
    #[must_use]
    pub fn with_venue(mut self, venue: Option<String>) -> Self {
        self.venue = venue.filter(|v| !v.trim().is_empty());
        self
    }

    /// Attach subject category tags.
    #[must_use]
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// `YYYY-MM-DD`, a bare year, or [`UNKNOWN_DATE`].
    pub fn published(&self) -> &str {
        &self.published
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn venue(&self) -> Option<&str> {
        self.venue.as_deref()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// True when the source could not supply a date.
    pub fn has_unknown_date(&self) -> bool {
        self.published == UNKNOWN_DATE
    }

    /// Key used to collapse the same paper reported more than once.
    ///
    /// Lowercased, trimmed, first 80 characters of the title.
    pub fn dedup_key(&self) -> String {
        self.title.to_lowercase().trim().chars().take(80).collect()
    }
}

/// A record paired with its keyword relevance score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredPaper {
    pub paper: PaperRecord,
    pub score: u32,
}

/// Truncate to at most `max` characters, respecting UTF-8 boundaries.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Collapse every whitespace run to a single space and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authors(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Author {i}")).collect()
    }

    #[test]
    fn test_summary_truncated_to_limit() {
        let long = "x".repeat(800);
        let paper = PaperRecord::new(Source::Arxiv, "T", &long, "2025-01-01", "u", vec![]);
        assert_eq!(paper.summary().chars().count(), MAX_SUMMARY_CHARS);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "é".repeat(600);
        let cut = truncate_chars(&text, 500);
        assert_eq!(cut.chars().count(), 500);
    }

    #[test]
    fn test_authors_capped() {
        let paper = PaperRecord::new(Source::Arxiv, "T", "", "2025-01-01", "u", authors(8));
        assert_eq!(paper.authors().len(), MAX_AUTHORS);
        assert_eq!(paper.authors()[4], "Author 5");
    }

    #[test]
    fn test_empty_published_becomes_unknown() {
        let paper = PaperRecord::new(Source::SemanticScholar, "T", "", "", "u", vec![]);
        assert!(paper.has_unknown_date());
        assert_eq!(paper.published(), UNKNOWN_DATE);
    }

    #[test]
    fn test_blank_venue_dropped() {
        let paper = PaperRecord::new(Source::SemanticScholar, "T", "", "2025", "u", vec![])
            .with_venue(Some("  ".to_string()));
        assert_eq!(paper.venue(), None);
    }

    #[test]
    fn test_dedup_key_normalizes() {
        let title = format!("  {}", "A".repeat(100));
        let paper = PaperRecord::new(Source::Arxiv, title, "", "2025-01-01", "u", vec![]);
        let key = paper.dedup_key();
        assert_eq!(key.chars().count(), 80);
        assert!(key.chars().all(|c| c == 'a'));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("  Fused\n   attention\tkernels "),
            "Fused attention kernels"
        );
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(Source::Arxiv.to_string(), "arXiv");
        assert_eq!(Source::SemanticScholar.to_string(), "Semantic Scholar");
    }
}
