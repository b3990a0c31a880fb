use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait StoragePort: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> anyhow::Result<()>;
    async fn read_object(&self, key: &str) -> anyhow::Result<Vec<u8>>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    async fn signed_url(&self, key: &str, ttl: Duration) -> anyhow::Result<String>;

    async fn signed_urls(&self, keys: &[String], ttl: Duration) -> anyhow::Result<Vec<String>> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            out.push(self.signed_url(key, ttl).await?);
        }
        Ok(out)
    }
}
