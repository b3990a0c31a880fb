use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::credential_store::CredentialStore;
use crate::application::ports::oauth_provider::{OAuthError, OAuthProvider};

#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Exchanges a refresh token for a new access token and persists it.
///
/// One attempt per call; the stored refresh token is never replaced here.
/// Parallel refreshes for the same user are not coordinated, the last write wins.
pub struct RefreshToken<'a, P, C>
where
    P: OAuthProvider + ?Sized,
    C: CredentialStore + ?Sized,
{
    pub provider: &'a P,
    pub store: &'a C,
}

impl<'a, P, C> RefreshToken<'a, P, C>
where
    P: OAuthProvider + ?Sized,
    C: CredentialStore + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, refresh_token: &str) -> AppResult<RefreshedToken> {
        let provider = self.provider.provider_name();
        let grant = self
            .provider
            .refresh_access_token(refresh_token)
            .await
            .map_err(|e| {
                match &e {
                    OAuthError::Transport(_) => {
                        tracing::error!(error = %e, %user_id, provider, "token_refresh_unavailable")
                    }
                    _ => tracing::warn!(error = %e, %user_id, provider, "token_refresh_rejected"),
                }
                AppError::from(e)
            })?;

        let updated = self
            .store
            .update_access_token(user_id, provider, &grant.access_token, grant.expires_at)
            .await?;
        if !updated {
            tracing::warn!(%user_id, provider, "token_refresh_credential_missing");
            return Err(AppError::ReconnectRequired);
        }
        tracing::debug!(%user_id, provider, expires_at = ?grant.expires_at, "token_refreshed");
        Ok(RefreshedToken {
            access_token: grant.access_token,
            expires_at: grant.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{FakeOAuthProvider, InMemoryCredentials};
    use crate::domain::integrations::oauth::{GOOGLE_PROVIDER, OAuthCredential};
    use chrono::{Duration, Utc};

    fn stored(expires_in: Duration) -> OAuthCredential {
        OAuthCredential {
            access_token: "old-access".into(),
            refresh_token: Some("refresh-1".into()),
            expires_at: Some(Utc::now() + expires_in),
            connected_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn valid_refresh_token_updates_access_token_only() {
        let user = Uuid::new_v4();
        let store = InMemoryCredentials::default();
        store
            .save(user, GOOGLE_PROVIDER, &stored(Duration::minutes(-5)))
            .await
            .unwrap();
        let mut provider = FakeOAuthProvider::new("refresh-1");
        provider.rotate_refresh_token = true;

        let out = RefreshToken {
            provider: &provider,
            store: &store,
        }
        .execute(user, "refresh-1")
        .await
        .unwrap();

        let cred = store.snapshot(user, GOOGLE_PROVIDER).unwrap();
        assert_eq!(cred.access_token, out.access_token);
        assert_eq!(cred.expires_at, out.expires_at);
        assert_eq!(cred.refresh_token.as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn invalid_refresh_token_leaves_state_untouched() {
        let user = Uuid::new_v4();
        let store = InMemoryCredentials::default();
        let before = stored(Duration::minutes(-5));
        store.save(user, GOOGLE_PROVIDER, &before).await.unwrap();
        let provider = FakeOAuthProvider::new("refresh-1");

        let res = RefreshToken {
            provider: &provider,
            store: &store,
        }
        .execute(user, "revoked")
        .await;

        assert!(matches!(res, Err(AppError::ReconnectRequired)));
        let after = store.snapshot(user, GOOGLE_PROVIDER).unwrap();
        assert_eq!(after.access_token, "old-access");
        assert_eq!(after.expires_at, before.expires_at);
        assert_eq!(provider.refresh_count(), 1);
    }

    #[tokio::test]
    async fn provider_outage_is_upstream_error() {
        let user = Uuid::new_v4();
        let store = InMemoryCredentials::default();
        store
            .save(user, GOOGLE_PROVIDER, &stored(Duration::minutes(-5)))
            .await
            .unwrap();
        let mut provider = FakeOAuthProvider::new("refresh-1");
        provider.transport_down = true;

        let res = RefreshToken {
            provider: &provider,
            store: &store,
        }
        .execute(user, "refresh-1")
        .await;
        assert!(matches!(res, Err(AppError::Upstream(_))));
        assert_eq!(
            store.snapshot(user, GOOGLE_PROVIDER).unwrap().access_token,
            "old-access"
        );
    }

    #[tokio::test]
    async fn disconnected_user_needs_reconnect() {
        let store = InMemoryCredentials::default();
        let provider = FakeOAuthProvider::new("refresh-1");
        let res = RefreshToken {
            provider: &provider,
            store: &store,
        }
        .execute(Uuid::new_v4(), "refresh-1")
        .await;
        assert!(matches!(res, Err(AppError::ReconnectRequired)));
    }
}
