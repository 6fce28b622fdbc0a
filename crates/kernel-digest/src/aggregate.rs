//! Aggregation: dedupe, recency filter, score, rank, truncate.

use chrono::{Duration, NaiveDate};
use std::collections::HashSet;

use crate::paper::{truncate_chars, PaperRecord, ScoredPaper};
use crate::relevance::relevance_score;

/// Stage counts and the final ranked list.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Records received from all sources.
    pub raw: usize,
    /// Records left after title dedup.
    pub deduped: usize,
    /// Records inside the recency window.
    pub recent: usize,
    /// True when the window was empty and the full deduped list was used.
    pub fell_back: bool,
    /// Highest-scoring records, best first.
    pub top: Vec<ScoredPaper>,
}

/// Keep the first record seen for each normalized title.
#[must_use]
pub fn deduplicate(papers: Vec<PaperRecord>) -> Vec<PaperRecord> {
    let mut seen = HashSet::new();
    papers
        .into_iter()
        .filter(|p| seen.insert(p.dedup_key()))
        .collect()
}

/// Earliest publication date still inside the window, as `YYYY-MM-DD`.
///
/// Windows reaching past the calendar's start clamp to `NaiveDate::MIN`,
/// which keeps every dated record.
#[must_use]
pub fn cutoff_date(today: NaiveDate, lookback_days: u32) -> String {
    today
        .checked_sub_signed(Duration::days(i64::from(lookback_days)))
        .unwrap_or(NaiveDate::MIN)
        .format("%Y-%m-%d")
        .to_string()
}

/// Keep records published on or after the cutoff, plus undated ones.
///
/// Dates are compared as strings, which orders `YYYY-MM-DD` correctly.
#[must_use]
pub fn filter_recent(
    papers: &[PaperRecord],
    today: NaiveDate,
    lookback_days: u32,
) -> Vec<PaperRecord> {
    let cutoff = cutoff_date(today, lookback_days);
    papers
        .iter()
        .filter(|p| p.has_unknown_date() || truncate_chars(p.published(), 10) >= cutoff)
        .cloned()
        .collect()
}

/// Score every record and return them best first, keeping at most `top_n`.
///
/// The sort is stable, so equal scores keep their incoming order.
#[must_use]
pub fn rank(papers: Vec<PaperRecord>, top_n: usize) -> Vec<ScoredPaper> {
    let mut scored: Vec<ScoredPaper> = papers
        .into_iter()
        .map(|paper| ScoredPaper {
            score: relevance_score(&paper),
            paper,
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(top_n);
    scored
}

/// Run the whole aggregation over the concatenated source results.
///
/// If nothing falls inside the recency window the deduplicated list is
/// ranked instead, so a quiet week still produces a digest.
#[must_use]
pub fn aggregate(
    papers: Vec<PaperRecord>,
    today: NaiveDate,
    lookback_days: u32,
    top_n: usize,
) -> Aggregation {
    let raw = papers.len();
    let unique = deduplicate(papers);
    let deduped = unique.len();

    let recent_papers = filter_recent(&unique, today, lookback_days);
    let recent = recent_papers.len();
    let fell_back = recent_papers.is_empty();

    let pool = if fell_back { unique } else { recent_papers };

    Aggregation {
        raw,
        deduped,
        recent,
        fell_back,
        top: rank(pool, top_n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paper::Source;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 18).unwrap()
    }

    fn paper(title: &str, published: &str) -> PaperRecord {
        PaperRecord::new(Source::Arxiv, title, "", published, "u", vec![])
    }

    fn with_summary(title: &str, summary: &str) -> PaperRecord {
        PaperRecord::new(Source::Arxiv, title, summary, "2025-10-17", "u", vec![])
    }

    fn titles(papers: &[PaperRecord]) -> Vec<&str> {
        papers.iter().map(|p| p.title()).collect()
    }

    #[test]
    fn test_dedup_keeps_first_and_preserves_order() {
        let papers = vec![
            paper("Alpha", "2025-10-17"),
            paper("Beta", "2025-10-17"),
            paper("  ALPHA ", "2025-10-10"),
            paper("Gamma", "2025-10-17"),
            paper("beta", "2025-10-01"),
        ];
        let unique = deduplicate(papers);
        assert_eq!(titles(&unique), vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(unique[0].published(), "2025-10-17");
    }

    #[test]
    fn test_dedup_matches_on_80_char_prefix() {
        let prefix = "p".repeat(80);
        let papers = vec![
            paper(&format!("{prefix} first variant"), "2025-10-17"),
            paper(&format!("{} second variant", prefix.to_uppercase()), "2025-10-17"),
        ];
        let unique = deduplicate(papers);
        assert_eq!(unique.len(), 1);
        assert!(unique[0].title().ends_with("first variant"));
    }

    #[test]
    fn test_dedup_different_prefixes_kept() {
        let papers = vec![paper("Fused GEMM", "2025-10-17"), paper("Fused GEMV", "2025-10-17")];
        assert_eq!(deduplicate(papers).len(), 2);
    }

    #[test]
    fn test_cutoff_date() {
        assert_eq!(cutoff_date(today(), 3), "2025-10-15");
        assert_eq!(cutoff_date(today(), 0), "2025-10-18");
        assert_eq!(cutoff_date(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(), 3), "2025-02-27");
    }

    #[test]
    fn test_huge_lookback_keeps_everything() {
        assert!(cutoff_date(today(), u32::MAX) < "0001-01-01".to_string());

        let papers = vec![paper("Ancient", "1999-01-01"), paper("Today", "2025-10-18")];
        let result = aggregate(papers, today(), 100_000_000, 15);
        assert_eq!(result.recent, 2);
        assert!(!result.fell_back);
    }

    #[test]
    fn test_recency_boundary() {
        let papers = vec![
            paper("On the boundary", "2025-10-15"),
            paper("One day too old", "2025-10-14"),
            paper("Today", "2025-10-18"),
        ];
        let recent = filter_recent(&papers, today(), 3);
        assert_eq!(titles(&recent), vec!["On the boundary", "Today"]);
    }

    #[test]
    fn test_unknown_date_always_kept() {
        let papers = vec![paper("Undated", "unknown"), paper("Ancient", "1999-01-01")];
        let recent = filter_recent(&papers, today(), 0);
        assert_eq!(titles(&recent), vec!["Undated"]);
    }

    #[test]
    fn test_bare_year_sorts_before_cutoff() {
        let recent = filter_recent(&[paper("Year only", "2025")], today(), 3);
        assert!(recent.is_empty());
    }

    #[test]
    fn test_empty_window_falls_back_to_deduped_list() {
        let papers = vec![
            paper("Old A", "2024-01-01"),
            paper("Old B", "2024-02-01"),
            paper("old a", "2024-03-01"),
        ];
        let result = aggregate(papers, today(), 3, 15);
        assert!(result.fell_back);
        assert_eq!(result.raw, 3);
        assert_eq!(result.deduped, 2);
        assert_eq!(result.recent, 0);
        let kept: Vec<_> = result.top.iter().map(|s| s.paper.title()).collect();
        assert_eq!(kept, vec!["Old A", "Old B"]);
    }

    #[test]
    fn test_no_fallback_when_window_has_papers() {
        let papers = vec![paper("Old", "2024-01-01"), paper("New", "2025-10-17")];
        let result = aggregate(papers, today(), 3, 15);
        assert!(!result.fell_back);
        assert_eq!(result.top.len(), 1);
        assert_eq!(result.top[0].paper.title(), "New");
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let papers = vec![
            with_summary("Tie one", "cuda"),
            with_summary("Best", "cuda triton cutlass"),
            with_summary("Tie two", "triton"),
            with_summary("Zero", "nothing here"),
            with_summary("Tie three", "hopper"),
        ];
        let ranked = rank(papers, 15);
        let order: Vec<_> = ranked.iter().map(|s| s.paper.title()).collect();
        assert_eq!(order, vec!["Best", "Tie one", "Tie two", "Tie three", "Zero"]);
        assert_eq!(ranked[0].score, 3);
        assert_eq!(ranked[4].score, 0);
    }

    #[test]
    fn test_rank_truncates_to_top_n() {
        // Every fifth paper mentions a keyword; the rest score zero.
        let papers: Vec<_> = (0..20)
            .map(|i| {
                let summary = if i % 5 == 0 { "cuda" } else { "plain" };
                with_summary(&format!("Paper {i:02}"), summary)
            })
            .collect();

        let ranked = rank(papers, 15);
        assert_eq!(ranked.len(), 15);

        let order: Vec<_> = ranked.iter().map(|s| s.paper.title().to_string()).collect();
        assert_eq!(&order[..4], ["Paper 00", "Paper 05", "Paper 10", "Paper 15"]);
        assert_eq!(&order[4..7], ["Paper 01", "Paper 02", "Paper 03"]);
        assert_eq!(order[14], "Paper 13");
    }

    #[test]
    fn test_aggregate_empty_input() {
        let result = aggregate(Vec::new(), today(), 3, 15);
        assert_eq!(result.raw, 0);
        assert!(result.top.is_empty());
    }
}
