use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::access::{self, DocumentAccess};
use crate::application::use_cases::documents::delete_document::DeleteDocument;
use crate::application::use_cases::documents::get_document::GetDocument;
use crate::application::use_cases::documents::list_documents::ListDocuments;
use crate::application::use_cases::documents::rename_document::RenameDocument;
use crate::application::use_cases::documents::upload_document::UploadDocument;
use crate::bootstrap::app_context::AppContext;
use crate::domain::documents::document::Document as DomainDocument;
use crate::domain::documents::permissions::{AccessLevel, Permission};
use crate::presentation::http::auth::{Bearer, authenticate};
use crate::presentation::http::error::{ApiError, ErrorResponse};

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Short-lived download link
    pub url: Option<String>,
}

impl DocumentResponse {
    fn from_domain(d: DomainDocument, url: Option<String>) -> Self {
        Self {
            id: d.id,
            owner_id: d.owner_id,
            name: d.name,
            content_type: d.content_type,
            size: d.size,
            created_at: d.created_at,
            updated_at: d.updated_at,
            url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SharedDocumentResponse {
    #[serde(flatten)]
    pub document: DocumentResponse,
    pub permissions: Vec<Permission>,
    pub shared_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentListResponse {
    pub owned: Vec<DocumentResponse>,
    pub shared: Vec<SharedDocumentResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub has_access: bool,
    pub access_level: Option<AccessLevel>,
    pub permissions: Vec<Permission>,
    pub owner_id: Option<Uuid>,
}

impl From<DocumentAccess> for AccessResponse {
    fn from(a: DocumentAccess) -> Self {
        Self {
            has_access: a.has_access,
            access_level: a.access_level,
            permissions: a.permissions,
            owner_id: a.owner_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentDetailResponse {
    #[serde(flatten)]
    pub document: DocumentResponse,
    pub access: AccessResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RenameDocumentRequest {
    pub name: String,
}

/// OpenAPI schema for the multipart upload body; never constructed.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentMultipart {
    /// File to upload
    #[schema(value_type = String, format = Binary)]
    file: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/documents", get(list_documents).post(upload_document))
        .route(
            "/documents/:id",
            get(get_document)
                .patch(rename_document)
                .delete(delete_document),
        )
        .route("/documents/:id/access", get(check_document_access))
        .with_state(ctx)
}

#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "Documents",
    request_body(content = UploadDocumentMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 201, body = DocumentResponse),
        (status = 400, body = ErrorResponse),
        (status = 413, body = ErrorResponse)
    )
)]
pub async fn upload_document(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;

    let mut upload: Option<(Vec<u8>, Option<String>, Option<String>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field.bytes().await.map_err(multipart_error)?;
        // DefaultBodyLimit covers the whole body; this is the per-file cap.
        if data.len() > ctx.cfg.upload_max_bytes {
            return Err(ApiError::PayloadTooLarge);
        }
        upload = Some((data.to_vec(), file_name, content_type));
    }
    let (bytes, file_name, content_type) =
        upload.ok_or_else(|| ApiError::bad_request("missing 'file' field"))?;

    let repo = ctx.document_repo();
    let storage = ctx.storage_port();
    let doc = UploadDocument {
        repo: repo.as_ref(),
        storage: storage.as_ref(),
    }
    .execute(user_id, bytes, file_name, content_type)
    .await?;
    let url = storage
        .signed_url(&doc.storage_key, ctx.cfg.signed_url_ttl())
        .await
        .map_err(|e| tracing::warn!(error = ?e, doc_id = %doc.id, "signed_url_failed"))
        .ok();
    Ok((
        StatusCode::CREATED,
        Json(DocumentResponse::from_domain(doc, url)),
    ))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::bad_request(err.body_text())
    }
}

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "Documents",
    responses((status = 200, body = DocumentListResponse))
)]
pub async fn list_documents(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let repo = ctx.document_repo();
    let shares = ctx.shares_repo();
    let storage = ctx.storage_port();
    let listing = ListDocuments {
        repo: repo.as_ref(),
        shares: shares.as_ref(),
        storage: storage.as_ref(),
        url_ttl: ctx.cfg.signed_url_ttl(),
    }
    .execute(user_id)
    .await?;
    Ok(Json(DocumentListResponse {
        owned: listing
            .owned
            .into_iter()
            .map(|v| DocumentResponse::from_domain(v.document, v.url))
            .collect(),
        shared: listing
            .shared
            .into_iter()
            .map(|v| SharedDocumentResponse {
                document: DocumentResponse::from_domain(v.document, v.url),
                permissions: v.permissions,
                shared_at: v.shared_at,
            })
            .collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, body = DocumentDetailResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_document(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentDetailResponse>, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let repo = ctx.document_repo();
    let access_repo = ctx.access_repo();
    let storage = ctx.storage_port();
    let details = GetDocument {
        repo: repo.as_ref(),
        access: access_repo.as_ref(),
        storage: storage.as_ref(),
        url_ttl: ctx.cfg.signed_url_ttl(),
    }
    .execute(user_id, id)
    .await?;
    Ok(Json(DocumentDetailResponse {
        document: DocumentResponse::from_domain(details.document, Some(details.url)),
        access: details.access.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}/access",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses((status = 200, body = AccessResponse))
)]
pub async fn check_document_access(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
) -> Result<Json<AccessResponse>, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let access_repo = ctx.access_repo();
    let access = access::check_access(access_repo.as_ref(), id, user_id).await;
    Ok(Json(access.into()))
}

#[utoipa::path(
    patch,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = RenameDocumentRequest,
    responses(
        (status = 200, body = DocumentResponse),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn rename_document(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let repo = ctx.document_repo();
    let access_repo = ctx.access_repo();
    let doc = RenameDocument {
        repo: repo.as_ref(),
        access: access_repo.as_ref(),
    }
    .execute(user_id, id, &req.name)
    .await?;
    Ok(Json(DocumentResponse::from_domain(doc, None)))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 204),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn delete_document(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let repo = ctx.document_repo();
    let access_repo = ctx.access_repo();
    let storage = ctx.storage_port();
    DeleteDocument {
        repo: repo.as_ref(),
        access: access_repo.as_ref(),
        storage: storage.as_ref(),
    }
    .execute(id, user_id)
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
