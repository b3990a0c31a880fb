use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::documents::document::{Share, SharedDocument};
use crate::domain::documents::permissions::Permission;

#[async_trait]
pub trait SharesRepository: Send + Sync {
    /// Creates or replaces the share of `document_id` with `grantee_id`.
    async fn upsert_share(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        grantee_id: Uuid,
        permissions: Option<&[Permission]>,
    ) -> anyhow::Result<Share>;

    async fn list_document_shares(&self, document_id: Uuid) -> anyhow::Result<Vec<Share>>;

    async fn delete_share(&self, document_id: Uuid, grantee_id: Uuid) -> anyhow::Result<bool>;

    async fn list_shared_with(&self, grantee_id: Uuid) -> anyhow::Result<Vec<SharedDocument>>;
}
