use uuid::Uuid;

use crate::application::errors::AppResult;
use crate::application::ports::credential_store::CredentialStore;
use crate::application::ports::oauth_provider::OAuthProvider;
use crate::domain::integrations::oauth::OAuthCredential;

/// Finishes the authorization-code flow and stores the resulting credential.
pub struct CompleteConnect<'a, P, C>
where
    P: OAuthProvider + ?Sized,
    C: CredentialStore + ?Sized,
{
    pub provider: &'a P,
    pub store: &'a C,
}

impl<'a, P, C> CompleteConnect<'a, P, C>
where
    P: OAuthProvider + ?Sized,
    C: CredentialStore + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, code: &str) -> AppResult<OAuthCredential> {
        let provider = self.provider.provider_name();
        let grant = self.provider.exchange_code(code).await.map_err(|e| {
            tracing::warn!(error = %e, %user_id, provider, "code_exchange_failed");
            e
        })?;

        // Providers only hand out a refresh token on first consent.
        let refresh_token = match grant.refresh_token {
            Some(t) => Some(t),
            None => self
                .store
                .get(user_id, provider)
                .await?
                .and_then(|c| c.refresh_token),
        };
        let credential = OAuthCredential {
            access_token: grant.access_token,
            refresh_token,
            expires_at: grant.expires_at,
            connected_at: chrono::Utc::now(),
        };
        self.store.save(user_id, provider, &credential).await?;
        tracing::info!(%user_id, provider, "oauth_connected");
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::AppError;
    use crate::application::test_support::{FakeOAuthProvider, InMemoryCredentials};
    use crate::domain::integrations::oauth::GOOGLE_PROVIDER;

    #[tokio::test]
    async fn stores_exchanged_tokens() {
        let user = Uuid::new_v4();
        let store = InMemoryCredentials::default();
        let provider = FakeOAuthProvider::new("refresh-1");
        CompleteConnect {
            provider: &provider,
            store: &store,
        }
        .execute(user, "good-code")
        .await
        .unwrap();
        let cred = store.snapshot(user, GOOGLE_PROVIDER).unwrap();
        assert_eq!(cred.access_token, "exchanged-access");
        assert_eq!(cred.refresh_token.as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn bad_code_stores_nothing() {
        let user = Uuid::new_v4();
        let store = InMemoryCredentials::default();
        let provider = FakeOAuthProvider::new("refresh-1");
        let res = CompleteConnect {
            provider: &provider,
            store: &store,
        }
        .execute(user, "stale-code")
        .await;
        assert!(matches!(res, Err(AppError::ReconnectRequired)));
        assert!(store.snapshot(user, GOOGLE_PROVIDER).is_none());
    }
}
