use std::time::Duration;

use uuid::Uuid;

use crate::application::access::{self, DocumentAccess};
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::access_repository::AccessRepository;
use crate::application::ports::document_repository::DocumentRepository;
use crate::application::ports::storage_port::StoragePort;
use crate::domain::documents::document::Document;
use crate::domain::documents::permissions::Permission;

#[derive(Debug, Clone)]
pub struct DocumentDetails {
    pub document: Document,
    pub access: DocumentAccess,
    pub url: String,
}

pub struct GetDocument<'a, R, A, S>
where
    R: DocumentRepository + ?Sized,
    A: AccessRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub repo: &'a R,
    pub access: &'a A,
    pub storage: &'a S,
    pub url_ttl: Duration,
}

impl<'a, R, A, S> GetDocument<'a, R, A, S>
where
    R: DocumentRepository + ?Sized,
    A: AccessRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, id: Uuid) -> AppResult<DocumentDetails> {
        let access = access::require(self.access, id, user_id, Permission::Read).await?;
        let document = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("document not found"))?;
        let url = self
            .storage
            .signed_url(&document.storage_key, self.url_ttl)
            .await
            .map_err(AppError::Upstream)?;
        Ok(DocumentDetails {
            document,
            access,
            url,
        })
    }
}
