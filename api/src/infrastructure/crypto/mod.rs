use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand::RngCore;
use sha2::{Digest, Sha256};

const ENVELOPE_PREFIX: &str = "v1";
const NONCE_LEN: usize = 12;

/// AES-256-GCM over `v1:<nonce b64>:<ciphertext b64>` envelopes.
/// The key is the SHA-256 of the configured secret.
#[derive(Clone)]
pub struct TokenCipher {
    key: Key<Aes256Gcm>,
}

impl TokenCipher {
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        Self {
            key: *Key::<Aes256Gcm>::from_slice(&digest),
        }
    }

    pub fn seal(&self, plaintext: &str) -> anyhow::Result<String> {
        let cipher = Aes256Gcm::new(&self.key);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let ct = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| anyhow::anyhow!("encrypt failed: {}", e))?;
        Ok(format!(
            "{}:{}:{}",
            ENVELOPE_PREFIX,
            B64.encode(nonce_bytes),
            B64.encode(ct)
        ))
    }

    pub fn open(&self, envelope: &str) -> anyhow::Result<String> {
        let mut parts = envelope.splitn(3, ':');
        let (Some(ENVELOPE_PREFIX), Some(n_b64), Some(c_b64)) =
            (parts.next(), parts.next(), parts.next())
        else {
            anyhow::bail!("invalid token envelope");
        };
        let nonce_bytes = B64
            .decode(n_b64)
            .map_err(|e| anyhow::anyhow!("b64 decode nonce: {}", e))?;
        if nonce_bytes.len() != NONCE_LEN {
            anyhow::bail!("invalid nonce length");
        }
        let ct = B64
            .decode(c_b64)
            .map_err(|e| anyhow::anyhow!("b64 decode ct: {}", e))?;
        let pt = Aes256Gcm::new(&self.key)
            .decrypt(Nonce::from_slice(&nonce_bytes), ct.as_ref())
            .map_err(|e| anyhow::anyhow!("decrypt failed: {}", e))?;
        Ok(String::from_utf8(pt)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_value_opens_with_same_secret() {
        let c = TokenCipher::new("k1");
        let sealed = c.seal("ya29.token").unwrap();
        assert!(sealed.starts_with("v1:"));
        assert!(!sealed.contains("ya29.token"));
        assert_eq!(c.open(&sealed).unwrap(), "ya29.token");
    }

    #[test]
    fn nonces_differ_per_seal() {
        let c = TokenCipher::new("k1");
        assert_ne!(c.seal("x").unwrap(), c.seal("x").unwrap());
    }

    #[test]
    fn wrong_secret_or_garbage_fails() {
        let sealed = TokenCipher::new("k1").seal("x").unwrap();
        assert!(TokenCipher::new("k2").open(&sealed).is_err());
        assert!(TokenCipher::new("k1").open("plain-token").is_err());
        assert!(TokenCipher::new("k1").open("v1:AAAA:BBBB").is_err());
    }
}
