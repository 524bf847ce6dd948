use google_gmail1::Gmail;
use yup_oauth2::{ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::config::{Config, GmailConfig};
use crate::token_refresh::refresh_access_token;
use crate::token_store::ConfigTokenStore;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use std::env;
use std::path::Path;
use tracing::info;

pub type GmailHub = Gmail<HttpsConnector<HttpConnector>>;

/// Lifetime assumed for the access token stored in config.
const STORED_TOKEN_TTL_SECS: i64 = 3599;

/// Installed-app secret built from `[gmail_oauth]`.
fn application_secret(gmail: &GmailConfig) -> ApplicationSecret {
    ApplicationSecret {
        client_id: gmail.client_id.clone(),
        client_secret: gmail.client_secret.clone(),
        token_uri: gmail.urls.token_url.clone(),
        auth_uri: gmail.urls.auth_url.clone(),
        redirect_uris: vec!["http://localhost".to_string()],
        ..Default::default()
    }
}

fn https_connector() -> HttpsConnector<HttpConnector> {
    hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build()
}

fn refresh_requested() -> bool {
    env::var("REFRESH").is_ok_and(|v| v == "1")
}

/// Access token to start with, and its lifetime in seconds. A refreshed
/// token is written back to `config_path` before it is used.
async fn starting_token(
    gmail: &GmailConfig,
    config_path: &Path,
) -> Result<(String, i64), Box<dyn std::error::Error>> {
    if !refresh_requested() {
        return Ok((gmail.tokens.access_token.clone(), STORED_TOKEN_TTL_SECS));
    }
    info!(config = %config_path.display(), "Refreshing access token");
    let token = refresh_access_token(gmail).await?;
    Config::update_access_token(config_path, &token.access_token)?;
    Ok((token.access_token, token.expires_in))
}

/// Build a Gmail client from the `[gmail_oauth]` section. With `REFRESH=1`
/// the access token is refreshed first.
pub async fn create_hub(
    cfg: &Config,
    config_path: &Path,
) -> Result<GmailHub, Box<dyn std::error::Error>> {
    let gmail = cfg
        .gmail
        .as_ref()
        .ok_or("config has no [gmail_oauth] section")?;

    let (access_token, ttl) = starting_token(gmail, config_path).await?;
    let store = ConfigTokenStore::new(access_token, gmail.tokens.refresh_token.clone(), ttl);

    let auth = InstalledFlowAuthenticator::builder(
        application_secret(gmail),
        InstalledFlowReturnMethod::HTTPRedirect,
    )
    .with_storage(Box::new(store))
    .build()
    .await?;

    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(https_connector());

    Ok(Gmail::new(client, auth))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gmail_config() -> GmailConfig {
        toml::from_str(
            r#"
            client_id = "123.apps.googleusercontent.com"
            client_secret = "shh"

            [tokens]
            refresh_token = "1//refresh"
            access_token = "ya29.access"

            [urls]
            token_url = "https://oauth2.example.com/token"
            auth_url = "https://accounts.example.com/auth"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn secret_uses_configured_client_and_endpoints() {
        let secret = application_secret(&gmail_config());
        assert_eq!(secret.client_id, "123.apps.googleusercontent.com");
        assert_eq!(secret.client_secret, "shh");
        assert_eq!(secret.token_uri, "https://oauth2.example.com/token");
        assert_eq!(secret.auth_uri, "https://accounts.example.com/auth");
        assert_eq!(secret.redirect_uris, vec!["http://localhost".to_string()]);
        assert_eq!(secret.project_id, None);
    }

    #[tokio::test]
    async fn stored_token_is_used_without_refresh() {
        if refresh_requested() {
            return;
        }
        let (token, ttl) = starting_token(&gmail_config(), Path::new("unused.toml"))
            .await
            .unwrap();
        assert_eq!(token, "ya29.access");
        assert_eq!(ttl, STORED_TOKEN_TTL_SECS);
    }
}
