use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::documents::document::{Document, NewDocument};

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert(&self, doc: &NewDocument) -> anyhow::Result<Document>;

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Document>>;

    /// Documents owned by `owner_id`, newest first.
    async fn list_owned(&self, owner_id: Uuid) -> anyhow::Result<Vec<Document>>;

    async fn rename(&self, id: Uuid, name: &str) -> anyhow::Result<Option<Document>>;

    // Returns the deleted row, None if not found or not owned
    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> anyhow::Result<Option<Document>>;
}
