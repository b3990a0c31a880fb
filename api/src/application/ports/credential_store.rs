use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::integrations::oauth::OAuthCredential;

/// Per-user third-party credentials, keyed by provider name.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, user_id: Uuid, provider: &str) -> anyhow::Result<Option<OAuthCredential>>;

    async fn save(
        &self,
        user_id: Uuid,
        provider: &str,
        credential: &OAuthCredential,
    ) -> anyhow::Result<()>;

    /// Overwrites the access token and its expiry; the refresh token is left untouched.
    /// Returns false when no credential exists.
    async fn update_access_token(
        &self,
        user_id: Uuid,
        provider: &str,
        access_token: &str,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> anyhow::Result<bool>;

    async fn delete(&self, user_id: Uuid, provider: &str) -> anyhow::Result<bool>;
}
