//! Digest content generator.
//!
//! Builds the HTML email body (and a plain-text alternative) from the
//! ranked paper list.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::paper::{truncate_chars, PaperRecord, ScoredPaper};

/// Summaries are shortened to this many characters in the digest.
pub const SUMMARY_PREVIEW_CHARS: usize = 300;

/// Authors listed per paper before "et al.".
pub const MAX_LISTED_AUTHORS: usize = 3;

/// Generates digest email content from ranked papers.
pub struct DigestGenerator;

impl DigestGenerator {
    /// Subject line for the digest sent on `date_str`.
    #[must_use]
    pub fn subject(date_str: &str) -> String {
        format!("Kernel Fusion & CuTe DSL Research Digest — {date_str}")
    }

    /// Generate the HTML email body.
    #[must_use]
    pub fn generate_html(papers: &[ScoredPaper], date_str: &str, lookback_days: u32) -> String {
        if papers.is_empty() {
            return format!(
                r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; color: #333;">
    <h1>Kernel Fusion Research Digest &mdash; {date_str}</h1>
    <p>No new papers found in the last {lookback_days} days. This can happen on
    slower weeks; the next digest will catch any new publications.</p>
</body>
</html>"#,
                date_str = html_escape(date_str),
                lookback_days = lookback_days,
            );
        }

        let mut rows = String::new();
        for scored in papers {
            let paper = &scored.paper;
            let venue = paper
                .venue()
                .map(|v| format!(" &mdash; <em>{}</em>", html_escape(v)))
                .unwrap_or_default();

            let _ = write!(
                rows,
                r#"
        <tr style="border-bottom: 1px solid #eee;">
            <td style="padding: 16px 0;">
                <h3 style="margin: 0 0 4px 0;">
                    <a href="{url}" style="color: #1a1a2e; text-decoration: none;">{title}</a>
                </h3>
                <p style="margin: 2px 0; color: #666; font-size: 13px;">
                    {authors}{venue} &middot; {published} &middot; <span style="background: #f0f0f0; padding: 2px 6px; border-radius: 3px; font-size: 11px;">{source}</span>
                </p>
                <p style="margin: 8px 0 0 0; font-size: 14px; color: #444;">{summary}</p>
            </td>
        </tr>
"#,
                url = html_escape(paper.url()),
                title = html_escape(paper.title()),
                authors = html_escape(&author_line(paper.authors())),
                venue = venue,
                published = html_escape(paper.published()),
                source = paper.source(),
                summary = html_escape(&summary_preview(paper.summary())),
            );
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; color: #222; max-width: 700px; margin: 0 auto;">
    <h1 style="color: #1a1a2e; border-bottom: 2px solid #e94560; padding-bottom: 8px;">
        Kernel Fusion &amp; CuTe DSL &mdash; Research Digest
    </h1>
    <p style="color: #666;">{date_str} &middot; {count} papers &middot; Last {lookback_days} days</p>

    <table style="width: 100%; border-collapse: collapse;">
        {rows}
    </table>

    <hr style="border: 1px solid #eee; margin: 24px 0;">
    <p style="color: #999; font-size: 12px;">
        Sources: arXiv, Semantic Scholar &middot; Auto-generated daily
    </p>
</body>
</html>"#,
            date_str = html_escape(date_str),
            count = papers.len(),
            lookback_days = lookback_days,
            rows = rows,
        )
    }

    /// Generate the plain-text email body.
    #[must_use]
    pub fn generate_text(papers: &[ScoredPaper], date_str: &str, lookback_days: u32) -> String {
        if papers.is_empty() {
            return format!(
                "Kernel Fusion Research Digest - {date_str}\n\n\
                 No new papers found in the last {lookback_days} days.\n"
            );
        }

        let mut text = format!(
            "Kernel Fusion & CuTe DSL - Research Digest
{date_str} | {count} papers | Last {lookback_days} days
================================================================================

",
            count = papers.len(),
        );

        for (i, scored) in papers.iter().enumerate() {
            let _ = write!(
                text,
                "{n}. {title}\n   {url}\n   {meta}\n   {summary}\n\n",
                n = i + 1,
                title = scored.paper.title(),
                url = scored.paper.url(),
                meta = meta_line(&scored.paper),
                summary = summary_preview(scored.paper.summary()),
            );
        }

        text.push_str("---\nSources: arXiv, Semantic Scholar\n");
        text
    }
}

/// Format a timestamp the way the digest shows dates, e.g. "October 18, 2025".
#[must_use]
pub fn display_date(at: DateTime<Utc>) -> String {
    at.format("%B %d, %Y").to_string()
}

/// First three authors joined by ", ", with " et al." when more exist.
#[must_use]
pub fn author_line(authors: &[String]) -> String {
    let mut line = authors
        .iter()
        .take(MAX_LISTED_AUTHORS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if authors.len() > MAX_LISTED_AUTHORS {
        line.push_str(" et al.");
    }
    line
}

/// Summary cut to [`SUMMARY_PREVIEW_CHARS`], with an ellipsis when shortened.
#[must_use]
pub fn summary_preview(summary: &str) -> String {
    let mut preview = truncate_chars(summary, SUMMARY_PREVIEW_CHARS);
    if summary.chars().count() > SUMMARY_PREVIEW_CHARS {
        preview.push('…');
    }
    preview
}

/// "authors - venue | date | source" line used by the text body.
fn meta_line(paper: &PaperRecord) -> String {
    let mut meta = author_line(paper.authors());
    if let Some(venue) = paper.venue() {
        let _ = write!(meta, " - {venue}");
    }
    let _ = write!(meta, " | {} | {}", paper.published(), paper.source());
    meta
}

/// Simple HTML escaping for user content.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
