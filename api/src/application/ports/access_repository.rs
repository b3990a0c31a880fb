use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::documents::permissions::Permission;

/// A grant found in a user's shared-document list.
#[derive(Debug, Clone)]
pub struct SharedGrant {
    pub document_id: Uuid,
    pub owner_id: Uuid,
    pub permissions: Option<Vec<Permission>>,
}

#[async_trait]
pub trait AccessRepository: Send + Sync {
    async fn list_owned_document_ids(&self, user_id: Uuid) -> anyhow::Result<Vec<Uuid>>;
    async fn list_shared_grants(&self, user_id: Uuid) -> anyhow::Result<Vec<SharedGrant>>;
}
