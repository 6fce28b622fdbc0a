//! Error types for the digest job.
//!
//! Source errors are recoverable: the orchestrator logs them and carries on
//! with zero results for that query. Configuration and delivery errors are
//! fatal and bubble up to `main`.

use thiserror::Error;

/// Errors raised by a literature source client for a single query.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Atom feed could not be parsed
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSON body could not be decoded
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while exchanging credentials or sending the digest.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// OAuth or mail endpoint rejected the request
    #[error("{endpoint} returned {status}: {message}")]
    Api {
        endpoint: &'static str,
        status: u16,
        message: String,
    },

    /// Response body was not valid JSON
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Credentials could not be loaded
    #[error("delivery not configured: {0}")]
    Config(#[from] ConfigError),

    /// Response body lacked a field we depend on
    #[error("{endpoint} response missing `{field}`")]
    MissingField {
        endpoint: &'static str,
        field: &'static str,
    },

    /// Recipient or sender is not a valid mailbox
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// MIME message could not be assembled
    #[error("failed to build email message: {0}")]
    Message(#[from] lettre::error::Error),

    /// Dry-run preview could not be written
    #[error("failed to write preview: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required variable is unset or empty
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    /// Variable is set but cannot be parsed
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}
