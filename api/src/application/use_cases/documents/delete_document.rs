use uuid::Uuid;

use crate::application::access;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::access_repository::AccessRepository;
use crate::application::ports::document_repository::DocumentRepository;
use crate::application::ports::storage_port::StoragePort;

pub struct DeleteDocument<'a, R, A, S>
where
    R: DocumentRepository + ?Sized,
    A: AccessRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub repo: &'a R,
    pub access: &'a A,
    pub storage: &'a S,
}

impl<'a, R, A, S> DeleteDocument<'a, R, A, S>
where
    R: DocumentRepository + ?Sized,
    A: AccessRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        access::require_owner(self.access, id, user_id).await?;
        let doc = self
            .repo
            .delete_owned(id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("document not found"))?;
        // The row is gone; a leftover object is only logged.
        if let Err(e) = self.storage.delete_object(&doc.storage_key).await {
            tracing::warn!(error = ?e, doc_id = %id, "delete_object_failed");
        }
        tracing::info!(doc_id = %id, %user_id, "document_deleted");
        Ok(())
    }
}
