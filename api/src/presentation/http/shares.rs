use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::shares::create_share::CreateShare;
use crate::application::use_cases::shares::delete_share::DeleteShare;
use crate::application::use_cases::shares::list_document_shares::ListDocumentShares;
use crate::application::use_cases::shares::list_incoming::ListIncomingShares;
use crate::bootstrap::app_context::AppContext;
use crate::domain::documents::document::Share;
use crate::domain::documents::permissions::{self, Permission};
use crate::presentation::http::auth::{Bearer, authenticate};
use crate::presentation::http::error::{ApiError, ErrorResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShareRequest {
    pub email: String,
    /// `read` and/or `write`; omitted means read-only
    #[serde(default)]
    pub permissions: Option<Vec<Permission>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShareItem {
    pub document_id: Uuid,
    pub grantee_id: Uuid,
    pub grantee_email: String,
    /// Effective permissions
    pub permissions: Vec<Permission>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Share> for ShareItem {
    fn from(s: Share) -> Self {
        Self {
            document_id: s.document_id,
            grantee_id: s.grantee_id,
            grantee_email: s.grantee_email,
            permissions: s.permissions.unwrap_or_else(permissions::default_shared),
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IncomingShareItem {
    pub document_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub permissions: Vec<Permission>,
    pub shared_at: chrono::DateTime<chrono::Utc>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/documents/:id/shares",
            get(list_document_shares).post(create_share),
        )
        .route("/documents/:id/shares/:grantee_id", delete(delete_share))
        .route("/shares/incoming", get(list_incoming_shares))
        .with_state(ctx)
}

#[utoipa::path(
    post,
    path = "/api/documents/{id}/shares",
    tag = "Sharing",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = CreateShareRequest,
    responses(
        (status = 200, body = ShareItem),
        (status = 400, body = ErrorResponse),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn create_share(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateShareRequest>,
) -> Result<Json<ShareItem>, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let shares = ctx.shares_repo();
    let users = ctx.user_repo();
    let access_repo = ctx.access_repo();
    let share = CreateShare {
        repo: shares.as_ref(),
        users: users.as_ref(),
        access: access_repo.as_ref(),
    }
    .execute(user_id, id, &req.email, req.permissions)
    .await?;
    Ok(Json(share.into()))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}/shares",
    tag = "Sharing",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, body = [ShareItem]),
        (status = 403, body = ErrorResponse)
    )
)]
pub async fn list_document_shares(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ShareItem>>, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let shares = ctx.shares_repo();
    let access_repo = ctx.access_repo();
    let items = ListDocumentShares {
        repo: shares.as_ref(),
        access: access_repo.as_ref(),
    }
    .execute(user_id, id)
    .await?;
    Ok(Json(items.into_iter().map(ShareItem::from).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}/shares/{grantee_id}",
    tag = "Sharing",
    params(
        ("id" = Uuid, Path, description = "Document ID"),
        ("grantee_id" = Uuid, Path, description = "User whose access is revoked")
    ),
    responses(
        (status = 204),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn delete_share(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path((id, grantee_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let shares = ctx.shares_repo();
    let access_repo = ctx.access_repo();
    DeleteShare {
        repo: shares.as_ref(),
        access: access_repo.as_ref(),
    }
    .execute(user_id, id, grantee_id)
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/shares/incoming",
    tag = "Sharing",
    responses((status = 200, body = [IncomingShareItem]))
)]
pub async fn list_incoming_shares(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<Vec<IncomingShareItem>>, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let shares = ctx.shares_repo();
    let items = ListIncomingShares {
        repo: shares.as_ref(),
    }
    .execute(user_id)
    .await?;
    Ok(Json(
        items
            .into_iter()
            .map(|s| IncomingShareItem {
                document_id: s.document.id,
                owner_id: s.document.owner_id,
                name: s.document.name,
                content_type: s.document.content_type,
                size: s.document.size,
                permissions: s.permissions.unwrap_or_else(permissions::default_shared),
                shared_at: s.shared_at,
            })
            .collect(),
    ))
}
