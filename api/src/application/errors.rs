use thiserror::Error;

use crate::application::ports::oauth_provider::OAuthError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("authentication required")]
    Unauthenticated,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// The stored third-party grant is no longer usable; the user must reconnect.
    #[error("reconnect required")]
    ReconnectRequired,
    #[error("upstream provider error")]
    Upstream(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }
}

impl From<OAuthError> for AppError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::InvalidGrant(_) | OAuthError::Unauthorized => AppError::ReconnectRequired,
            OAuthError::Transport(msg) => AppError::Upstream(anyhow::anyhow!(msg)),
        }
    }
}
