//! Configuration for the digest job.

use chrono::{Datelike, Utc};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Fallback recipient when `RECIPIENT_EMAIL` is unset.
pub const DEFAULT_RECIPIENT: &str = "research-digest@example.com";

/// Default recency window in days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 3;

/// Number of papers kept in the final digest.
pub const DEFAULT_TOP_N: usize = 15;

/// Per-query result cap for arXiv.
pub const ARXIV_MAX_RESULTS: usize = 15;

/// Per-query result cap for Semantic Scholar.
pub const SEMANTIC_SCHOLAR_MAX_RESULTS: usize = 10;

/// Where dry runs write the rendered digest.
pub const DEFAULT_PREVIEW_PATH: &str = "digest_preview.html";

/// arXiv search expressions, run in this order.
pub const ARXIV_QUERIES: &[&str] = &[
    r#"all:"kernel fusion" AND (GPU OR CUDA OR tensor)"#,
    r#"all:"CuTe" AND (CUTLASS OR NVIDIA OR kernel)"#,
    r#"all:"automated kernel" AND (GPU OR CUDA OR generation)"#,
    r#"all:"kernel compilation" AND (GPU OR tensor OR fusion)"#,
    "all:CUTLASS AND (fusion OR optimization OR automat*)",
    r#"all:"triton" AND ("kernel fusion" OR "code generation")"#,
    r#"all:"tensor compiler" AND (fusion OR GPU OR autotuning)"#,
];

/// Semantic Scholar free-text queries, run after the arXiv set.
pub const SEMANTIC_SCHOLAR_QUERIES: &[&str] = &[
    "CuTe DSL CUTLASS kernel fusion GPU",
    "automated kernel generation CUDA LLM",
    "kernel fusion compiler GPU optimization 2025",
    "tensor compiler autotuning GPU kernels",
];

/// Base URLs of every external service the job talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub arxiv: String,
    pub semantic_scholar: String,
    pub oauth_token: String,
    pub gmail_send: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            arxiv: "http://export.arxiv.org/api/query".to_string(),
            semantic_scholar: "https://api.semanticscholar.org/graph/v1/paper/search".to_string(),
            oauth_token: "https://oauth2.googleapis.com/token".to_string(),
            gmail_send: "https://gmail.googleapis.com/gmail/v1/users/me/messages/send"
                .to_string(),
        }
    }
}

/// Run-wide configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Single recipient of the digest.
    pub recipient: String,
    /// Sender mailbox (Gmail rewrites this to the authorized account).
    pub from_email: String,
    /// Recency window in days.
    pub lookback_days: u32,
    /// Write a preview file instead of sending.
    pub dry_run: bool,
    /// Preview file location for dry runs.
    pub preview_path: PathBuf,
    /// Number of papers kept after ranking.
    pub top_n: usize,
    /// arXiv queries in execution order.
    pub arxiv_queries: Vec<String>,
    /// Semantic Scholar queries in execution order.
    pub semantic_scholar_queries: Vec<String>,
    /// Per-query cap for arXiv.
    pub arxiv_max_results: usize,
    /// Per-query cap for Semantic Scholar.
    pub semantic_scholar_max_results: usize,
    /// Year filter sent to Semantic Scholar, e.g. `2025-2026`.
    pub semantic_scholar_years: String,
    /// Service URLs.
    pub endpoints: Endpoints,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            recipient: DEFAULT_RECIPIENT.to_string(),
            from_email: DEFAULT_RECIPIENT.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            dry_run: false,
            preview_path: PathBuf::from(DEFAULT_PREVIEW_PATH),
            top_n: DEFAULT_TOP_N,
            arxiv_queries: ARXIV_QUERIES.iter().map(ToString::to_string).collect(),
            semantic_scholar_queries: SEMANTIC_SCHOLAR_QUERIES
                .iter()
                .map(ToString::to_string)
                .collect(),
            arxiv_max_results: ARXIV_MAX_RESULTS,
            semantic_scholar_max_results: SEMANTIC_SCHOLAR_MAX_RESULTS,
            semantic_scholar_years: default_year_range(),
            endpoints: Endpoints::default(),
        }
    }
}

impl DigestConfig {
    /// Create configuration from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `RECIPIENT_EMAIL`: Recipient (default: research-digest@example.com)
    /// - `DIGEST_FROM_EMAIL`: Sender (default: the recipient)
    /// - `LOOKBACK_DAYS`: Recency window in days (default: 3)
    /// - `DRY_RUN`: Any non-empty value skips delivery
    /// - `SEMANTIC_SCHOLAR_YEARS`: Year range (default: last year through this year)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DigestConfig::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let recipient = get("RECIPIENT_EMAIL").unwrap_or_else(|| DEFAULT_RECIPIENT.to_string());
        let from_email = get("DIGEST_FROM_EMAIL").unwrap_or_else(|| recipient.clone());

        let lookback_days: u32 = match get("LOOKBACK_DAYS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "LOOKBACK_DAYS",
                value: raw.clone(),
            })?,
            None => DEFAULT_LOOKBACK_DAYS,
        };

        let dry_run = lookup("DRY_RUN").is_some_and(|v| !v.is_empty());

        let semantic_scholar_years =
            get("SEMANTIC_SCHOLAR_YEARS").unwrap_or_else(default_year_range);

        Ok(Self {
            recipient,
            from_email,
            lookback_days,
            dry_run,
            semantic_scholar_years,
            ..Self::default()
        })
    }

    /// Total number of search requests a run will issue.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.arxiv_queries.len() + self.semantic_scholar_queries.len()
    }
}

/// OAuth client credentials for the Gmail API.
///
/// Only loaded on the live-send path, so dry runs work without them.
#[derive(Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for GmailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

impl GmailCredentials {
    /// Create credentials from environment variables.
    ///
    /// # Required Environment Variables
    /// - `GMAIL_CLIENT_ID`
    /// - `GMAIL_CLIENT_SECRET`
    /// - `GMAIL_REFRESH_TOKEN`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GmailCredentials::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        Ok(Self {
            client_id: require("GMAIL_CLIENT_ID")?,
            client_secret: require("GMAIL_CLIENT_SECRET")?,
            refresh_token: require("GMAIL_REFRESH_TOKEN")?,
        })
    }
}

/// `<last year>-<this year>`, so the filter rolls over in January.
fn default_year_range() -> String {
    let year = Utc::now().year();
    format!("{}-{}", year - 1, year)
}
