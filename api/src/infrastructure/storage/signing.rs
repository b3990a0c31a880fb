use std::time::Duration;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const DOWNLOAD_PURPOSE: &str = "download";

#[derive(Debug, Serialize, Deserialize)]
struct DownloadClaims {
    sub: String,
    purpose: String,
    exp: usize,
}

/// Issues and checks short-lived download links for locally stored objects.
#[derive(Clone)]
pub struct UrlSigner {
    secret: String,
    public_base: String,
}

impl UrlSigner {
    pub fn new(secret: impl Into<String>, public_base: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn sign(&self, key: &str, ttl: Duration) -> anyhow::Result<String> {
        let exp = chrono::Utc::now().timestamp() as usize + ttl.as_secs() as usize;
        let claims = DownloadClaims {
            sub: key.to_string(),
            purpose: DOWNLOAD_PURPOSE.into(),
            exp,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        let path = key
            .split('/')
            .map(|seg| urlencoding::encode(seg).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Ok(format!(
            "{}/api/uploads/{}?token={}",
            self.public_base, path, token
        ))
    }

    /// Fails unless `token` was issued for exactly `key` and is unexpired.
    pub fn verify(&self, key: &str, token: &str) -> anyhow::Result<()> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<DownloadClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        if data.claims.purpose != DOWNLOAD_PURPOSE || data.claims.sub != key {
            anyhow::bail!("token does not match object");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_of(url: &str) -> &str {
        url.split("token=").nth(1).unwrap()
    }

    #[test]
    fn url_points_at_uploads_route() {
        let signer = UrlSigner::new("s", "http://api.test/");
        let url = signer.sign("u/d/my file.pdf", Duration::from_secs(60)).unwrap();
        assert!(url.starts_with("http://api.test/api/uploads/u/d/my%20file.pdf?token="));
    }

    #[test]
    fn token_is_bound_to_its_key() {
        let signer = UrlSigner::new("s", "http://api.test");
        let url = signer.sign("u/d/a.txt", Duration::from_secs(60)).unwrap();
        let token = token_of(&url);
        assert!(signer.verify("u/d/a.txt", token).is_ok());
        assert!(signer.verify("u/d/b.txt", token).is_err());
        assert!(UrlSigner::new("other", "x").verify("u/d/a.txt", token).is_err());
    }
}
