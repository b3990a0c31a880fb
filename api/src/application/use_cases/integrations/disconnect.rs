use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::credential_store::CredentialStore;
use crate::application::ports::oauth_provider::OAuthProvider;

pub struct Disconnect<'a, P, C>
where
    P: OAuthProvider + ?Sized,
    C: CredentialStore + ?Sized,
{
    pub provider: &'a P,
    pub store: &'a C,
}

impl<'a, P, C> Disconnect<'a, P, C>
where
    P: OAuthProvider + ?Sized,
    C: CredentialStore + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> AppResult<()> {
        let provider = self.provider.provider_name();
        let cred = self
            .store
            .get(user_id, provider)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} account not connected", provider)))?;

        // Revocation is best-effort; the local credential goes regardless.
        let token = cred.refresh_token.as_deref().unwrap_or(&cred.access_token);
        if let Err(e) = self.provider.revoke(token).await {
            tracing::warn!(error = %e, %user_id, provider, "token_revoke_failed");
        }
        self.store.delete(user_id, provider).await?;
        tracing::info!(%user_id, provider, "oauth_disconnected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{FakeOAuthProvider, InMemoryCredentials};
    use crate::domain::integrations::oauth::{GOOGLE_PROVIDER, OAuthCredential};

    #[tokio::test]
    async fn revokes_refresh_token_and_deletes_credential() {
        let user = Uuid::new_v4();
        let store = InMemoryCredentials::default();
        store
            .save(
                user,
                GOOGLE_PROVIDER,
                &OAuthCredential {
                    access_token: "a".into(),
                    refresh_token: Some("refresh-1".into()),
                    expires_at: None,
                    connected_at: chrono::Utc::now(),
                },
            )
            .await
            .unwrap();
        let provider = FakeOAuthProvider::new("refresh-1");
        Disconnect {
            provider: &provider,
            store: &store,
        }
        .execute(user)
        .await
        .unwrap();
        assert!(store.snapshot(user, GOOGLE_PROVIDER).is_none());
        assert_eq!(*provider.revoked.lock().unwrap(), vec!["refresh-1".to_string()]);
    }
}
