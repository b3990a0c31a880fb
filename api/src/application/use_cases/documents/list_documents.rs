use std::time::Duration;

use uuid::Uuid;

use crate::application::errors::AppResult;
use crate::application::ports::document_repository::DocumentRepository;
use crate::application::ports::shares_repository::SharesRepository;
use crate::application::ports::storage_port::StoragePort;
use crate::domain::documents::document::Document;
use crate::domain::documents::permissions::{self, Permission};

#[derive(Debug, Clone)]
pub struct DocumentView {
    pub document: Document,
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SharedDocumentView {
    pub document: Document,
    pub permissions: Vec<Permission>,
    pub shared_at: chrono::DateTime<chrono::Utc>,
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentListing {
    pub owned: Vec<DocumentView>,
    pub shared: Vec<SharedDocumentView>,
}

pub struct ListDocuments<'a, R, SH, S>
where
    R: DocumentRepository + ?Sized,
    SH: SharesRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub repo: &'a R,
    pub shares: &'a SH,
    pub storage: &'a S,
    pub url_ttl: Duration,
}

impl<'a, R, SH, S> ListDocuments<'a, R, SH, S>
where
    R: DocumentRepository + ?Sized,
    SH: SharesRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> AppResult<DocumentListing> {
        let owned = self.repo.list_owned(user_id).await?;
        let shared = self.shares.list_shared_with(user_id).await?;

        let keys: Vec<String> = owned
            .iter()
            .map(|d| d.storage_key.clone())
            .chain(shared.iter().map(|s| s.document.storage_key.clone()))
            .collect();
        // A signing failure degrades to a listing without links.
        let mut urls = match self.storage.signed_urls(&keys, self.url_ttl).await {
            Ok(urls) => urls.into_iter().map(Some).collect::<Vec<_>>(),
            Err(e) => {
                tracing::warn!(error = ?e, %user_id, "signed_urls_failed");
                vec![None; keys.len()]
            }
        }
        .into_iter();

        let owned = owned
            .into_iter()
            .map(|document| DocumentView {
                document,
                url: urls.next().flatten(),
            })
            .collect();
        let shared = shared
            .into_iter()
            .map(|s| SharedDocumentView {
                document: s.document,
                permissions: s.permissions.unwrap_or_else(permissions::default_shared),
                shared_at: s.shared_at,
                url: urls.next().flatten(),
            })
            .collect();
        Ok(DocumentListing { owned, shared })
    }
}
