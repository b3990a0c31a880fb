use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::document_repository::DocumentRepository;
use crate::application::ports::storage_port::StoragePort;
use crate::domain::documents::document::{self, Document, NewDocument};

pub struct UploadDocument<'a, R, S>
where
    R: DocumentRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub repo: &'a R,
    pub storage: &'a S,
}

impl<'a, R, S> UploadDocument<'a, R, S>
where
    R: DocumentRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub async fn execute(
        &self,
        owner_id: Uuid,
        bytes: Vec<u8>,
        orig_filename: Option<String>,
        content_type: Option<String>,
    ) -> AppResult<Document> {
        if bytes.is_empty() {
            return Err(AppError::validation("file is empty"));
        }
        let name = orig_filename
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("untitled")
            .to_string();
        let doc_id = Uuid::new_v4();
        let key = document::object_key(owner_id, doc_id, &name);

        self.storage
            .put_object(&key, &bytes, content_type.as_deref())
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, %doc_id, "put_object_failed");
                AppError::Upstream(err)
            })?;

        let new_doc = NewDocument {
            id: doc_id,
            owner_id,
            name,
            content_type,
            size: bytes.len() as i64,
            storage_key: key.clone(),
        };
        match self.repo.insert(&new_doc).await {
            Ok(doc) => {
                tracing::info!(%doc_id, %owner_id, size = doc.size, "document_uploaded");
                Ok(doc)
            }
            Err(err) => {
                tracing::error!(error = ?err, %doc_id, "insert_document_failed");
                if let Err(e) = self.storage.delete_object(&key).await {
                    tracing::warn!(error = ?e, %key, "orphan_object_cleanup_failed");
                }
                Err(err.into())
            }
        }
    }
}
