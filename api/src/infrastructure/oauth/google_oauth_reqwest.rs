use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::application::ports::oauth_provider::{OAuthError, OAuthProvider};
use crate::bootstrap::config::GoogleConfig;
use crate::domain::integrations::oauth::{GOOGLE_PROVIDER, TokenGrant};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
}

pub struct GoogleOAuthProvider {
    client: reqwest::Client,
    cfg: GoogleConfig,
}

impl GoogleOAuthProvider {
    pub fn new(cfg: GoogleConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            cfg,
        }
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenGrant, OAuthError> {
        let resp = self
            .client
            .post(TOKEN_URL)
            .form(form)
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(classify_token_error(status, &body));
        }
        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| OAuthError::Transport(format!("malformed token response: {e}")))?;
        Ok(TokenGrant {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            expires_at: parsed.expires_in.map(|s| Utc::now() + Duration::seconds(s)),
        })
    }
}

// Only the error code leaves this function; provider bodies can echo request data.
fn classify_token_error(status: StatusCode, body: &str) -> OAuthError {
    let code = serde_json::from_str::<TokenErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_default();
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
            if code.is_empty() {
                OAuthError::InvalidGrant(format!("status {}", status.as_u16()))
            } else {
                OAuthError::InvalidGrant(code)
            }
        }
        _ => OAuthError::Transport(format!("token endpoint returned {}", status.as_u16())),
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthProvider {
    fn provider_name(&self) -> &'static str {
        GOOGLE_PROVIDER
    }

    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=offline&prompt=consent",
            AUTH_URL,
            urlencoding::encode(&self.cfg.client_id),
            urlencoding::encode(&self.cfg.redirect_uri),
            urlencoding::encode(DRIVE_SCOPE),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, OAuthError> {
        self.token_request(&[
            ("code", code),
            ("client_id", &self.cfg.client_id),
            ("client_secret", &self.cfg.client_secret),
            ("redirect_uri", &self.cfg.redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError> {
        self.token_request(&[
            ("refresh_token", refresh_token),
            ("client_id", &self.cfg.client_id),
            ("client_secret", &self.cfg.client_secret),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn revoke(&self, token: &str) -> Result<(), OAuthError> {
        let resp = self
            .client
            .post(REVOKE_URL)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;
        match resp.status() {
            s if s.is_success() => Ok(()),
            // Already revoked or expired.
            StatusCode::BAD_REQUEST => Ok(()),
            s => Err(OAuthError::Transport(format!(
                "revoke endpoint returned {}",
                s.as_u16()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GoogleOAuthProvider {
        GoogleOAuthProvider::new(GoogleConfig {
            client_id: "cid.apps".into(),
            client_secret: "shh".into(),
            redirect_uri: "http://api.test/api/integrations/google/callback".into(),
        })
    }

    #[test]
    fn authorize_url_requests_offline_access() {
        let url = provider().authorize_url("st@te");
        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("state=st%40te"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Fapi.test%2Fapi%2Fintegrations%2Fgoogle%2Fcallback"));
        assert!(!url.contains("shh"));
    }

    #[test]
    fn rejected_grants_are_distinguished_from_outages() {
        let err = classify_token_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#,
        );
        assert!(matches!(err, OAuthError::InvalidGrant(ref c) if c == "invalid_grant"));
        assert!(matches!(
            classify_token_error(StatusCode::UNAUTHORIZED, "not json"),
            OAuthError::InvalidGrant(_)
        ));
        assert!(matches!(
            classify_token_error(StatusCode::SERVICE_UNAVAILABLE, "{}"),
            OAuthError::Transport(_)
        ));
    }

    #[test]
    fn token_response_without_refresh_token_parses() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token":"ya29","expires_in":3599,"token_type":"Bearer"}"#)
                .unwrap();
        assert_eq!(parsed.access_token, "ya29");
        assert!(parsed.refresh_token.is_none());
        assert_eq!(parsed.expires_in, Some(3599));
    }
}
