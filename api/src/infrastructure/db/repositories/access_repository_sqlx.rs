use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::access_repository::{AccessRepository, SharedGrant};
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::shares_repository_sqlx::decode_permissions;

pub struct SqlxAccessRepository {
    pub pool: PgPool,
}

impl SqlxAccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessRepository for SqlxAccessRepository {
    async fn list_owned_document_ids(&self, user_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM documents WHERE owner_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn list_shared_grants(&self, user_id: Uuid) -> anyhow::Result<Vec<SharedGrant>> {
        let rows = sqlx::query(
            r#"SELECT s.document_id, d.owner_id, s.permissions
               FROM document_shares s
               JOIN documents d ON d.id = s.document_id
               WHERE s.grantee_id = $1"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| SharedGrant {
                document_id: r.get("document_id"),
                owner_id: r.get("owner_id"),
                permissions: decode_permissions(r.get("permissions")),
            })
            .collect())
    }
}
