use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use yup_oauth2::error::TokenStorageError;
use yup_oauth2::storage::{TokenInfo, TokenStorage};

/// In-memory token storage seeded from config, so the authenticator never
/// reads or writes a token cache on disk.
///
/// The expiry is fixed when the store is created. A token the authenticator
/// refreshes replaces the seed for the rest of the run; persisting it is
/// left to `Config::update_access_token`.
pub struct ConfigTokenStore {
    token: Mutex<TokenInfo>,
}

impl ConfigTokenStore {
    pub fn new(access_token: String, refresh_token: String, ttl_secs: i64) -> Self {
        Self {
            token: Mutex::new(TokenInfo {
                access_token: Some(access_token),
                refresh_token: Some(refresh_token),
                expires_at: Some(OffsetDateTime::now_utc() + Duration::seconds(ttl_secs)),
                id_token: None,
            }),
        }
    }
}

#[async_trait]
impl TokenStorage for ConfigTokenStore {
    async fn set(&self, scopes: &[&str], token: TokenInfo) -> Result<(), TokenStorageError> {
        debug!(?scopes, expires_at = ?token.expires_at, "Token replaced in memory");
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = token;
        Ok(())
    }

    async fn get(&self, _scopes: &[&str]) -> Option<TokenInfo> {
        Some(
            self.token
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCOPES: &[&str] = &["https://www.googleapis.com/auth/gmail.readonly"];

    #[tokio::test]
    async fn serves_the_configured_token_with_a_fixed_expiry() {
        let store =
            ConfigTokenStore::new("ya29.access".to_string(), "1//refresh".to_string(), 3599);

        let first = store.get(SCOPES).await.unwrap();
        assert_eq!(first.access_token.as_deref(), Some("ya29.access"));
        assert_eq!(first.refresh_token.as_deref(), Some("1//refresh"));
        assert!(first.expires_at.unwrap() > OffsetDateTime::now_utc());

        let second = store.get(SCOPES).await.unwrap();
        assert_eq!(second.expires_at, first.expires_at);
    }

    #[tokio::test]
    async fn refreshed_token_replaces_the_seed() {
        let store = ConfigTokenStore::new("old".to_string(), "1//refresh".to_string(), 0);
        let refreshed = TokenInfo {
            access_token: Some("new".to_string()),
            refresh_token: Some("1//refresh".to_string()),
            expires_at: Some(OffsetDateTime::now_utc() + Duration::seconds(3600)),
            id_token: None,
        };

        store.set(SCOPES, refreshed.clone()).await.unwrap();
        assert_eq!(store.get(SCOPES).await, Some(refreshed));
    }
}
