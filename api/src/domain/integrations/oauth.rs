use chrono::{DateTime, Duration, Utc};

pub const GOOGLE_PROVIDER: &str = "google";

/// Tokens are treated as expired this long before the provider-declared expiry.
pub const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Clone)]
pub struct OAuthCredential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Valid,
    Expired,
}

impl OAuthCredential {
    pub fn state_at(&self, now: DateTime<Utc>) -> CredentialState {
        match self.expires_at {
            Some(exp) if exp <= now + Duration::seconds(EXPIRY_SKEW_SECS) => {
                CredentialState::Expired
            }
            _ => CredentialState::Valid,
        }
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for OAuthCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredential")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .field("connected_at", &self.connected_at)
            .finish()
    }
}

/// Result of a token endpoint call.
#[derive(Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: Option<u64>,
    pub modified_at: Option<String>,
}
