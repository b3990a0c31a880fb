use async_trait::async_trait;
use thiserror::Error;

use crate::domain::integrations::oauth::TokenGrant;

#[derive(Debug, Error)]
pub enum OAuthError {
    /// The provider rejected the code or refresh token.
    #[error("grant rejected: {0}")]
    InvalidGrant(String),
    /// The provider rejected the access token on an API call.
    #[error("access token rejected")]
    Unauthorized,
    #[error("provider request failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;
    fn authorize_url(&self, state: &str) -> String;
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, OAuthError>;
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError>;
    async fn revoke(&self, token: &str) -> Result<(), OAuthError>;
}
