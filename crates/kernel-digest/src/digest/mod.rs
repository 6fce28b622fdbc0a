//! Email digest module.
//!
//! Renders the ranked papers to HTML and plain text, then delivers them
//! through the Gmail REST API after an OAuth refresh-token exchange.

mod email;
mod generator;
mod oauth;

pub use email::{build_message, encode_message, EmailSender};
pub use generator::{
    author_line, display_date, summary_preview, DigestGenerator, MAX_LISTED_AUTHORS,
    SUMMARY_PREVIEW_CHARS,
};
pub use oauth::refresh_access_token;
