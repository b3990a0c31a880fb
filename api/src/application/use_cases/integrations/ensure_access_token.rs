use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::credential_store::CredentialStore;
use crate::application::ports::oauth_provider::OAuthProvider;
use crate::application::use_cases::integrations::refresh_token::RefreshToken;
use crate::domain::integrations::oauth::CredentialState;

#[derive(Debug, Clone)]
pub struct ActiveToken {
    pub access_token: String,
    /// Whether this call already spent its refresh attempt.
    pub refreshed: bool,
}

pub struct EnsureAccessToken<'a, P, C>
where
    P: OAuthProvider + ?Sized,
    C: CredentialStore + ?Sized,
{
    pub provider: &'a P,
    pub store: &'a C,
}

impl<'a, P, C> EnsureAccessToken<'a, P, C>
where
    P: OAuthProvider + ?Sized,
    C: CredentialStore + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> AppResult<ActiveToken> {
        let provider = self.provider.provider_name();
        let cred = self
            .store
            .get(user_id, provider)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} account not connected", provider)))?;

        match cred.state_at(chrono::Utc::now()) {
            CredentialState::Valid => Ok(ActiveToken {
                access_token: cred.access_token,
                refreshed: false,
            }),
            CredentialState::Expired => {
                let refresh_token = cred.refresh_token.ok_or(AppError::ReconnectRequired)?;
                let out = RefreshToken {
                    provider: self.provider,
                    store: self.store,
                }
                .execute(user_id, &refresh_token)
                .await?;
                Ok(ActiveToken {
                    access_token: out.access_token,
                    refreshed: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{FakeOAuthProvider, InMemoryCredentials};
    use crate::domain::integrations::oauth::{GOOGLE_PROVIDER, OAuthCredential};
    use chrono::{Duration, Utc};

    async fn seed(store: &InMemoryCredentials, user: Uuid, expires_in: Duration, refresh: bool) {
        store
            .save(
                user,
                GOOGLE_PROVIDER,
                &OAuthCredential {
                    access_token: "stored-access".into(),
                    refresh_token: refresh.then(|| "refresh-1".to_string()),
                    expires_at: Some(Utc::now() + expires_in),
                    connected_at: Utc::now(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn valid_token_is_used_without_refresh() {
        let user = Uuid::new_v4();
        let store = InMemoryCredentials::default();
        seed(&store, user, Duration::hours(1), true).await;
        let provider = FakeOAuthProvider::new("refresh-1");
        let tok = EnsureAccessToken {
            provider: &provider,
            store: &store,
        }
        .execute(user)
        .await
        .unwrap();
        assert_eq!(tok.access_token, "stored-access");
        assert!(!tok.refreshed);
        assert_eq!(provider.refresh_count(), 0);
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_once() {
        let user = Uuid::new_v4();
        let store = InMemoryCredentials::default();
        seed(&store, user, Duration::seconds(10), true).await;
        let provider = FakeOAuthProvider::new("refresh-1");
        let tok = EnsureAccessToken {
            provider: &provider,
            store: &store,
        }
        .execute(user)
        .await
        .unwrap();
        assert!(tok.refreshed);
        assert_eq!(tok.access_token, "refreshed-access-1");
        assert_eq!(provider.refresh_count(), 1);
    }

    #[tokio::test]
    async fn expired_without_refresh_token_requires_reconnect() {
        let user = Uuid::new_v4();
        let store = InMemoryCredentials::default();
        seed(&store, user, Duration::minutes(-1), false).await;
        let provider = FakeOAuthProvider::new("refresh-1");
        let res = EnsureAccessToken {
            provider: &provider,
            store: &store,
        }
        .execute(user)
        .await;
        assert!(matches!(res, Err(AppError::ReconnectRequired)));
    }

    #[tokio::test]
    async fn missing_connection_is_not_found() {
        let store = InMemoryCredentials::default();
        let provider = FakeOAuthProvider::new("refresh-1");
        let res = EnsureAccessToken {
            provider: &provider,
            store: &store,
        }
        .execute(Uuid::new_v4())
        .await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
    }
}
