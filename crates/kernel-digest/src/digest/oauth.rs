//! OAuth refresh-token exchange for the Gmail API.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::GmailCredentials;
use crate::error::DeliveryError;

const ENDPOINT: &str = "OAuth token endpoint";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Trade the stored refresh token for a short-lived access token.
///
/// No retry: any failure here ends the run.
#[instrument(skip(client, credentials))]
pub async fn refresh_access_token(
    client: &Client,
    token_url: &str,
    credentials: &GmailCredentials,
) -> Result<String, DeliveryError> {
    let form = [
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("refresh_token", credentials.refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];

    let response = client.post(token_url).form(&form).send().await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(DeliveryError::Api {
            endpoint: ENDPOINT,
            status: status.as_u16(),
            message: body,
        });
    }

    let token: TokenResponse = serde_json::from_str(&body)?;
    let access_token = token
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or(DeliveryError::MissingField {
            endpoint: ENDPOINT,
            field: "access_token",
        })?;

    debug!("Obtained Gmail access token");
    Ok(access_token)
}
