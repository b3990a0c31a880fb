use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::shares_repository::SharesRepository;
use crate::domain::documents::document::{Share, SharedDocument};
use crate::domain::documents::permissions::Permission;
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::document_repository_sqlx::map_document;

pub struct SqlxSharesRepository {
    pub pool: PgPool,
}

impl SqlxSharesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// NULL and empty arrays both mean "unspecified".
pub(super) fn decode_permissions(raw: Option<Vec<String>>) -> Option<Vec<Permission>> {
    let perms: Vec<Permission> = raw?
        .iter()
        .filter_map(|s| {
            let p = Permission::parse(s);
            if p.is_none() {
                tracing::warn!(value = %s, "unknown_share_permission");
            }
            p
        })
        .collect();
    (!perms.is_empty()).then_some(perms)
}

fn encode_permissions(perms: Option<&[Permission]>) -> Option<Vec<String>> {
    perms.map(|p| p.iter().map(|x| x.as_str().to_string()).collect())
}

#[async_trait]
impl SharesRepository for SqlxSharesRepository {
    async fn upsert_share(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        grantee_id: Uuid,
        permissions: Option<&[Permission]>,
    ) -> anyhow::Result<Share> {
        let row = sqlx::query(
            r#"WITH s AS (
                 INSERT INTO document_shares (document_id, grantee_id, permissions, created_by)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (document_id, grantee_id)
                 DO UPDATE SET permissions = EXCLUDED.permissions
                 RETURNING document_id, grantee_id, permissions, created_by, created_at
               )
               SELECT s.*, u.email AS grantee_email FROM s JOIN users u ON u.id = s.grantee_id"#,
        )
        .bind(document_id)
        .bind(grantee_id)
        .bind(encode_permissions(permissions))
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Share {
            document_id: row.get("document_id"),
            grantee_id: row.get("grantee_id"),
            grantee_email: row.get("grantee_email"),
            permissions: decode_permissions(row.get("permissions")),
            created_by: row.get("created_by"),
            created_at: row.get("created_at"),
        })
    }

    async fn list_document_shares(&self, document_id: Uuid) -> anyhow::Result<Vec<Share>> {
        let rows = sqlx::query(
            r#"SELECT s.document_id, s.grantee_id, u.email AS grantee_email,
                      s.permissions, s.created_by, s.created_at
               FROM document_shares s
               JOIN users u ON u.id = s.grantee_id
               WHERE s.document_id = $1
               ORDER BY s.created_at ASC"#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Share {
                document_id: r.get("document_id"),
                grantee_id: r.get("grantee_id"),
                grantee_email: r.get("grantee_email"),
                permissions: decode_permissions(r.get("permissions")),
                created_by: r.get("created_by"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    async fn delete_share(&self, document_id: Uuid, grantee_id: Uuid) -> anyhow::Result<bool> {
        let res =
            sqlx::query("DELETE FROM document_shares WHERE document_id = $1 AND grantee_id = $2")
                .bind(document_id)
                .bind(grantee_id)
                .execute(&self.pool)
                .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_shared_with(&self, grantee_id: Uuid) -> anyhow::Result<Vec<SharedDocument>> {
        let rows = sqlx::query(
            r#"SELECT d.id, d.owner_id, d.name, d.content_type, d.size, d.storage_key,
                      d.created_at, d.updated_at,
                      s.permissions, s.created_at AS shared_at
               FROM document_shares s
               JOIN documents d ON d.id = s.document_id
               WHERE s.grantee_id = $1
               ORDER BY s.created_at DESC"#,
        )
        .bind(grantee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| SharedDocument {
                document: map_document(r),
                permissions: decode_permissions(r.get("permissions")),
                shared_at: r.get("shared_at"),
            })
            .collect())
    }
}
