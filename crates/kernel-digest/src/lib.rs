//! Kernel fusion research digest.
//!
//! This crate provides:
//! - arXiv and Semantic Scholar search clients
//! - Deduplication, recency filtering and keyword relevance ranking
//! - HTML and plain-text digest rendering
//! - Gmail API delivery via an OAuth refresh token

pub mod aggregate;
pub mod config;
pub mod digest;
pub mod error;
pub mod paper;
pub mod pipeline;
pub mod relevance;
pub mod sources;

// Re-export main types
pub use aggregate::Aggregation;
pub use config::{DigestConfig, Endpoints, GmailCredentials};
pub use digest::{DigestGenerator, EmailSender};
pub use error::{ConfigError, DeliveryError, SourceError};
pub use paper::{PaperRecord, ScoredPaper, Source};
pub use pipeline::{Delivery, Pipeline, RunSummary, SourcePlan};
pub use relevance::relevance_score;
pub use sources::{ArxivClient, LiteratureSource, SemanticScholarClient};
