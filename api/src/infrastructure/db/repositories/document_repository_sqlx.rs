use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::document_repository::DocumentRepository;
use crate::domain::documents::document::{Document, NewDocument};
use crate::infrastructure::db::PgPool;

pub struct SqlxDocumentRepository {
    pub pool: PgPool,
}

impl SqlxDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(super) fn map_document(r: &PgRow) -> Document {
    Document {
        id: r.get("id"),
        owner_id: r.get("owner_id"),
        name: r.get("name"),
        content_type: r.try_get("content_type").ok().flatten(),
        size: r.get("size"),
        storage_key: r.get("storage_key"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl DocumentRepository for SqlxDocumentRepository {
    async fn insert(&self, doc: &NewDocument) -> anyhow::Result<Document> {
        let row = sqlx::query(
            r#"INSERT INTO documents (id, owner_id, name, content_type, size, storage_key)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, owner_id, name, content_type, size, storage_key, created_at, updated_at"#,
        )
        .bind(doc.id)
        .bind(doc.owner_id)
        .bind(&doc.name)
        .bind(doc.content_type.as_deref())
        .bind(doc.size)
        .bind(&doc.storage_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_document(&row))
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Document>> {
        let row = sqlx::query(
            r#"SELECT id, owner_id, name, content_type, size, storage_key, created_at, updated_at
               FROM documents WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_document))
    }

    async fn list_owned(&self, owner_id: Uuid) -> anyhow::Result<Vec<Document>> {
        let rows = sqlx::query(
            r#"SELECT id, owner_id, name, content_type, size, storage_key, created_at, updated_at
               FROM documents WHERE owner_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_document).collect())
    }

    async fn rename(&self, id: Uuid, name: &str) -> anyhow::Result<Option<Document>> {
        let row = sqlx::query(
            r#"UPDATE documents SET name = $2, updated_at = now() WHERE id = $1
               RETURNING id, owner_id, name, content_type, size, storage_key, created_at, updated_at"#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_document))
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> anyhow::Result<Option<Document>> {
        let row = sqlx::query(
            r#"DELETE FROM documents WHERE id = $1 AND owner_id = $2
               RETURNING id, owner_id, name, content_type, size, storage_key, created_at, updated_at"#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_document))
    }
}
