//! Keyword relevance scoring.

use crate::paper::PaperRecord;

/// Terms that mark a paper as on-topic. Matched as lowercase substrings.
pub const KEYWORDS: [&str; 16] = [
    "cute",
    "cutlass",
    "kernel fusion",
    "automated kernel",
    "kernel generation",
    "gpu kernel",
    "tensor compiler",
    "triton",
    "tma",
    "wgmma",
    "hopper",
    "blackwell",
    "flash attention",
    "cuda",
    "llm kernel",
    "agentic",
];

/// Count how many distinct keywords appear in the title or summary.
///
/// Plain substring containment: "cute" also matches "execute". Repeated
/// occurrences of one keyword count once.
#[must_use]
pub fn relevance_score(paper: &PaperRecord) -> u32 {
    let text = format!("{} {}", paper.title(), paper.summary()).to_lowercase();
    KEYWORDS.iter().filter(|kw| text.contains(*kw)).count() as u32
}
