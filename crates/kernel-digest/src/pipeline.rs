//! Digest pipeline - orchestrates the full search-aggregate-render-deliver flow.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::aggregate::aggregate;
use crate::config::{DigestConfig, GmailCredentials};
use crate::digest::{display_date, DigestGenerator, EmailSender};
use crate::error::{DeliveryError, SourceError};
use crate::paper::{truncate_chars, ScoredPaper};
use crate::sources::{search_all, ArxivClient, LiteratureSource, SemanticScholarClient};

/// A source client together with the queries to run against it.
pub struct SourcePlan {
    /// Client used for every query in this plan.
    pub client: Box<dyn LiteratureSource>,
    /// Queries in execution order.
    pub queries: Vec<String>,
    /// Result cap per query.
    pub max_results: usize,
}

/// How the rendered digest left the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Sent through Gmail.
    Sent { message_id: String },
    /// Written to a local file (dry run).
    Preview { path: PathBuf },
}

/// Result of a single digest run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Records returned by all queries.
    pub raw: usize,
    /// Records left after dedup.
    pub deduped: usize,
    /// Records inside the recency window.
    pub recent: usize,
    /// Whether the empty-window fallback kicked in.
    pub fell_back: bool,
    /// Papers that made it into the digest, best first.
    pub selected: Vec<ScoredPaper>,
    /// Where the digest went.
    pub outcome: Delivery,
}

/// Digest pipeline orchestrator.
pub struct Pipeline {
    config: DigestConfig,
    plans: Vec<SourcePlan>,
    credentials: Option<GmailCredentials>,
}

impl Pipeline {
    /// Create a pipeline with the arXiv and Semantic Scholar clients.
    pub fn new(config: DigestConfig) -> Result<Self, SourceError> {
        let plans = vec![
            SourcePlan {
                client: Box::new(ArxivClient::with_base_url(config.endpoints.arxiv.clone())?),
                queries: config.arxiv_queries.clone(),
                max_results: config.arxiv_max_results,
            },
            SourcePlan {
                client: Box::new(SemanticScholarClient::with_base_url(
                    config.endpoints.semantic_scholar.clone(),
                    config.semantic_scholar_years.clone(),
                )?),
                queries: config.semantic_scholar_queries.clone(),
                max_results: config.semantic_scholar_max_results,
            },
        ];
        Ok(Self::with_sources(config, plans))
    }

    /// Create a pipeline over caller-supplied source plans.
    #[must_use]
    pub fn with_sources(config: DigestConfig, plans: Vec<SourcePlan>) -> Self {
        Self {
            config,
            plans,
            credentials: None,
        }
    }

    /// Use these credentials instead of reading them from the environment.
    #[must_use]
    pub fn with_credentials(mut self, credentials: GmailCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Run the digest once, now.
    pub async fn run(&self) -> Result<RunSummary, DeliveryError> {
        self.run_at(Utc::now()).await
    }

    /// Run the digest as if the current time were `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary, DeliveryError> {
        tracing::info!(
            started = %now.format("%Y-%m-%d %H:%M UTC"),
            lookback_days = self.config.lookback_days,
            recipient = %self.config.recipient,
            queries = self.config.query_count(),
            dry_run = self.config.dry_run,
            "Starting kernel digest"
        );

        // Collect papers from every source, in plan order
        let mut papers = Vec::new();
        for plan in &self.plans {
            tracing::info!(
                source = %plan.client.source(),
                queries = plan.queries.len(),
                "Searching"
            );
            let found = search_all(plan.client.as_ref(), &plan.queries, plan.max_results).await;
            papers.extend(found);
        }

        let aggregation = aggregate(
            papers,
            now.date_naive(),
            self.config.lookback_days,
            self.config.top_n,
        );

        tracing::info!(raw = aggregation.raw, "Total raw results");
        tracing::info!(deduped = aggregation.deduped, "After dedup");
        tracing::info!(
            recent = aggregation.recent,
            lookback_days = self.config.lookback_days,
            "After recency filter"
        );
        if aggregation.fell_back {
            tracing::info!("No papers in lookback window, using top results by relevance");
        }
        tracing::info!(top = aggregation.top.len(), "Top papers for digest");

        for scored in &aggregation.top {
            tracing::info!(
                "  [{}] {} ({})",
                scored.score,
                truncate_chars(scored.paper.title(), 80),
                scored.paper.published()
            );
        }

        let date_str = display_date(now);
        let html =
            DigestGenerator::generate_html(&aggregation.top, &date_str, self.config.lookback_days);

        let outcome = if self.config.dry_run {
            std::fs::write(&self.config.preview_path, &html)?;
            tracing::info!(
                path = %self.config.preview_path.display(),
                "[DRY RUN] Would send email, saved HTML preview"
            );
            Delivery::Preview {
                path: self.config.preview_path.clone(),
            }
        } else {
            let text = DigestGenerator::generate_text(
                &aggregation.top,
                &date_str,
                self.config.lookback_days,
            );
            let sender = self.sender()?;
            tracing::info!("Sending email");
            let message_id = sender
                .send(&DigestGenerator::subject(&date_str), &html, &text)
                .await?;
            Delivery::Sent { message_id }
        };

        Ok(RunSummary {
            raw: aggregation.raw,
            deduped: aggregation.deduped,
            recent: aggregation.recent,
            fell_back: aggregation.fell_back,
            selected: aggregation.top,
            outcome,
        })
    }

    /// Build the email sender, loading credentials from the environment
    /// unless they were supplied up front.
    pub fn sender(&self) -> Result<EmailSender, DeliveryError> {
        match &self.credentials {
            Some(credentials) => EmailSender::new(&self.config, credentials.clone()),
            None => EmailSender::from_env(&self.config),
        }
    }
}
