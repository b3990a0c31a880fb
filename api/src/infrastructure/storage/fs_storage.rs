use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::storage_port::StoragePort;
use crate::infrastructure::storage::signing::UrlSigner;

/// Objects as plain files under `root`; downloads go through the signed uploads route.
pub struct FsStorage {
    root: PathBuf,
    signer: UrlSigner,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>, signer: UrlSigner) -> Self {
        Self {
            root: root.into(),
            signer,
        }
    }

    // Reject anything that could climb out of root.
    fn resolve(&self, key: &str) -> anyhow::Result<PathBuf> {
        let mut relative = PathBuf::new();
        for component in Path::new(key).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => continue,
                _ => anyhow::bail!("forbidden"),
            }
        }
        if relative.as_os_str().is_empty() {
            anyhow::bail!("forbidden");
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StoragePort for FsStorage {
    async fn put_object(
        &self,
        key: &str,
        bytes: &[u8],
        _content_type: Option<&str>,
    ) -> anyhow::Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn read_object(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.resolve(key)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            anyhow::bail!("not_found");
        }
        Ok(tokio::fs::read(&path).await?)
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        }
        // Drop the per-document directory once empty.
        if let Some(parent) = path.parent() {
            if parent != self.root {
                let _ = tokio::fs::remove_dir(parent).await;
            }
        }
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> anyhow::Result<String> {
        self.resolve(key)?;
        self.signer.sign(key, ttl)
    }
}
