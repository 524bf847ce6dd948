use crate::config::GmailConfig;
use serde::Deserialize;
use tracing::{info, warn};
use urlencoding::encode;

#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Exchange the configured refresh token for a fresh access token.
pub async fn refresh_access_token(
    gmail: &GmailConfig,
) -> Result<TokenResponse, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();

    let body = format!(
        "client_id={}&client_secret={}&refresh_token={}&grant_type=refresh_token",
        encode(&gmail.client_id),
        encode(&gmail.client_secret),
        encode(&gmail.tokens.refresh_token),
    );

    let resp = client
        .post(&gmail.urls.token_url)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let error_text = resp.text().await?;
        warn!(%status, body = %error_text, "Token refresh rejected");
        return Err(error_text.into());
    }

    let token: TokenResponse = resp.json().await?;
    info!(expires_in = token.expires_in, "Access token refreshed");
    Ok(token)
}
