//! Email sender using the Gmail REST API.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::oauth::refresh_access_token;
use crate::config::{DigestConfig, GmailCredentials};
use crate::error::DeliveryError;

const ENDPOINT: &str = "Gmail send endpoint";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    raw: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

/// Email sender for research digests.
pub struct EmailSender {
    client: Client,
    credentials: GmailCredentials,
    from_email: String,
    to_email: String,
    token_url: String,
    send_url: String,
}

impl EmailSender {
    /// Create a new email sender with the given configuration.
    pub fn new(
        config: &DigestConfig,
        credentials: GmailCredentials,
    ) -> Result<Self, DeliveryError> {
        Ok(Self {
            client: Client::builder().build()?,
            credentials,
            from_email: config.from_email.clone(),
            to_email: config.recipient.clone(),
            token_url: config.endpoints.oauth_token.clone(),
            send_url: config.endpoints.gmail_send.clone(),
        })
    }

    /// Create a sender, reading OAuth credentials from the environment.
    pub fn from_env(config: &DigestConfig) -> Result<Self, DeliveryError> {
        let credentials = GmailCredentials::from_env()?;
        Self::new(config, credentials)
    }

    /// Send an email with HTML and plain-text content.
    ///
    /// Returns the Gmail message ID.
    #[instrument(skip(self, html_body, text_body))]
    pub async fn send(
        &self,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<String, DeliveryError> {
        let access_token =
            refresh_access_token(&self.client, &self.token_url, &self.credentials).await?;

        let message = build_message(
            &self.from_email,
            &self.to_email,
            subject,
            html_body,
            text_body,
        )?;
        let raw = encode_message(&message);

        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(&access_token)
            .json(&SendRequest { raw: &raw })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DeliveryError::Api {
                endpoint: ENDPOINT,
                status: status.as_u16(),
                message: body,
            });
        }

        let sent: SendResponse = serde_json::from_str(&body)?;
        let id = sent.id.ok_or(DeliveryError::MissingField {
            endpoint: ENDPOINT,
            field: "id",
        })?;

        tracing::info!(
            to = %self.to_email,
            message_id = %id,
            "Email sent successfully"
        );

        Ok(id)
    }

    /// Send a simple test email to verify configuration.
    pub async fn send_test(&self) -> Result<String, DeliveryError> {
        let subject = "Kernel Fusion Research Digest - Test Email";
        let html_body = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; color: #222;">
    <h1 style="color: #1a1a2e;">Kernel Fusion Research Digest</h1>
    <p style="color: #16a34a; font-weight: bold;">Email configuration is working!</p>
    <p>If you're seeing this, the Gmail API credentials are configured correctly.</p>
</body>
</html>"#;

        let text_body = "Kernel Fusion Research Digest - Test Email

Email configuration is working!

If you're seeing this, the Gmail API credentials are configured correctly.
";

        self.send(subject, html_body, text_body).await
    }
}

/// Build a `multipart/alternative` message with a text and an HTML part.
pub fn build_message(
    from: &str,
    to: &str,
    subject: &str,
    html_body: &str,
    text_body: &str,
) -> Result<Message, DeliveryError> {
    let from: Mailbox = from.parse()?;
    let to: Mailbox = to.parse()?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text_body.to_string()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html_body.to_string()),
                ),
        )?;

    Ok(message)
}

/// Base64url-encode the raw RFC 5322 bytes, as the Gmail API expects.
pub fn encode_message(message: &Message) -> String {
    URL_SAFE.encode(message.formatted())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> String {
        String::from_utf8(URL_SAFE.decode(raw).unwrap()).unwrap()
    }

    #[test]
    fn test_message_is_multipart_alternative() {
        let message = build_message(
            "sender@example.com",
            "reader@example.com",
            "Digest",
            "<p>Hello</p>",
            "Hello",
        )
        .unwrap();
        let raw = decode(&encode_message(&message));

        assert!(raw.contains("To: reader@example.com"));
        assert!(raw.contains("From: sender@example.com"));
        assert!(raw.contains("Subject: Digest"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/html; charset=utf-8"));
        assert!(raw.contains("text/plain; charset=utf-8"));
        assert!(raw.find("text/plain").unwrap() < raw.find("text/html").unwrap());
    }

    #[test]
    fn test_encoding_is_url_safe() {
        let message = build_message(
            "a@example.com",
            "b@example.com",
            "Kernel Fusion & CuTe DSL Research Digest — October 18, 2025",
            &"<p>ÿÿÿ???>>></p>".repeat(50),
            "text",
        )
        .unwrap();
        let raw = encode_message(&message);
        assert!(!raw.contains('+'));
        assert!(!raw.contains('/'));
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let err = build_message("a@example.com", "not an address", "s", "h", "t").unwrap_err();
        assert!(matches!(err, DeliveryError::Address(_)));
    }
}
