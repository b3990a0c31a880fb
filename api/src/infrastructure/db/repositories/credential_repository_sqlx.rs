use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::credential_store::CredentialStore;
use crate::domain::integrations::oauth::OAuthCredential;
use crate::infrastructure::crypto::TokenCipher;
use crate::infrastructure::db::PgPool;

/// OAuth credentials with both tokens sealed at rest.
pub struct SqlxCredentialRepository {
    pub pool: PgPool,
    cipher: TokenCipher,
}

impl SqlxCredentialRepository {
    pub fn new(pool: PgPool, cipher: TokenCipher) -> Self {
        Self { pool, cipher }
    }
}

#[async_trait]
impl CredentialStore for SqlxCredentialRepository {
    async fn get(&self, user_id: Uuid, provider: &str) -> anyhow::Result<Option<OAuthCredential>> {
        let row = sqlx::query(
            r#"SELECT access_token, refresh_token, expires_at, connected_at
               FROM oauth_credentials WHERE user_id = $1 AND provider = $2"#,
        )
        .bind(user_id)
        .bind(provider)
        .fetch_optional(&self.pool)
        .await?;
        let Some(r) = row else {
            return Ok(None);
        };
        let access: String = r.get("access_token");
        let refresh: Option<String> = r.get("refresh_token");
        Ok(Some(OAuthCredential {
            access_token: self.cipher.open(&access)?,
            refresh_token: refresh.map(|t| self.cipher.open(&t)).transpose()?,
            expires_at: r.get("expires_at"),
            connected_at: r.get("connected_at"),
        }))
    }

    async fn save(
        &self,
        user_id: Uuid,
        provider: &str,
        credential: &OAuthCredential,
    ) -> anyhow::Result<()> {
        let access = self.cipher.seal(&credential.access_token)?;
        let refresh = credential
            .refresh_token
            .as_deref()
            .map(|t| self.cipher.seal(t))
            .transpose()?;
        sqlx::query(
            r#"INSERT INTO oauth_credentials
                 (user_id, provider, access_token, refresh_token, expires_at, connected_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (user_id, provider) DO UPDATE SET
                 access_token = EXCLUDED.access_token,
                 refresh_token = EXCLUDED.refresh_token,
                 expires_at = EXCLUDED.expires_at,
                 connected_at = EXCLUDED.connected_at,
                 updated_at = now()"#,
        )
        .bind(user_id)
        .bind(provider)
        .bind(access)
        .bind(refresh)
        .bind(credential.expires_at)
        .bind(credential.connected_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_access_token(
        &self,
        user_id: Uuid,
        provider: &str,
        access_token: &str,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> anyhow::Result<bool> {
        let sealed = self.cipher.seal(access_token)?;
        let res = sqlx::query(
            r#"UPDATE oauth_credentials
               SET access_token = $3, expires_at = $4, updated_at = now()
               WHERE user_id = $1 AND provider = $2"#,
        )
        .bind(user_id)
        .bind(provider)
        .bind(sealed)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, user_id: Uuid, provider: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM oauth_credentials WHERE user_id = $1 AND provider = $2")
            .bind(user_id)
            .bind(provider)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
