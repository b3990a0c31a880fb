use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::errors::AppError;
use crate::application::use_cases::integrations::connect::CompleteConnect;
use crate::application::use_cases::integrations::disconnect::Disconnect;
use crate::application::use_cases::integrations::list_drive_files::ListDriveFiles;
use crate::application::use_cases::integrations::refresh_token::RefreshToken;
use crate::application::use_cases::integrations::status::GetConnectionStatus;
use crate::bootstrap::app_context::{AppContext, GoogleServices};
use crate::bootstrap::config::Config;
use crate::presentation::http::auth::{Bearer, authenticate};
use crate::presentation::http::error::{ApiError, ErrorResponse};

const CONNECT_PURPOSE: &str = "google_connect";
const CONNECT_STATE_TTL_SECS: usize = 10 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct ConnectState {
    sub: String,
    purpose: String,
    exp: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectResponse {
    pub authorize_url: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionStatusResponse {
    pub connected: bool,
    pub connected_at: Option<chrono::DateTime<chrono::Utc>>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FilesQuery {
    pub folder_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DriveFileItem {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: Option<u64>,
    pub modified_at: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", axum::routing::delete(disconnect))
        .route("/connect", get(connect))
        .route("/callback", get(callback))
        .route("/status", get(status))
        .route("/refresh", post(refresh))
        .route("/files", get(list_files))
        .with_state(ctx)
}

fn google(ctx: &AppContext) -> Result<GoogleServices, ApiError> {
    ctx.google()
        .ok_or_else(|| ApiError::not_found("google integration is not configured"))
}

fn issue_state(cfg: &Config, user_id: Uuid) -> anyhow::Result<String> {
    let claims = ConnectState {
        sub: user_id.to_string(),
        purpose: CONNECT_PURPOSE.into(),
        exp: chrono::Utc::now().timestamp() as usize + CONNECT_STATE_TTL_SECS,
    };
    Ok(jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.jwt_secret_pem.as_bytes()),
    )?)
}

fn verify_state(cfg: &Config, state: &str) -> anyhow::Result<Uuid> {
    let data = jsonwebtoken::decode::<ConnectState>(
        state,
        &DecodingKey::from_secret(cfg.jwt_secret_pem.as_bytes()),
        &Validation::default(),
    )?;
    if data.claims.purpose != CONNECT_PURPOSE {
        anyhow::bail!("state issued for another purpose");
    }
    Ok(Uuid::parse_str(&data.claims.sub)?)
}

#[utoipa::path(
    get,
    path = "/api/integrations/google/connect",
    tag = "Integrations",
    responses(
        (status = 200, body = ConnectResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn connect(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<ConnectResponse>, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let google = google(&ctx)?;
    let state = issue_state(&ctx.cfg, user_id).map_err(|e| {
        tracing::error!(error = ?e, "connect_state_encode_failed");
        ApiError::Internal
    })?;
    Ok(Json(ConnectResponse {
        authorize_url: google.provider.authorize_url(&state),
    }))
}

#[utoipa::path(
    get,
    path = "/api/integrations/google/callback",
    tag = "Integrations",
    security(()),
    params(CallbackQuery),
    responses((status = 303, description = "Redirect back to the frontend settings page"))
)]
pub async fn callback(
    State(ctx): State<AppContext>,
    Query(q): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    let google = google(&ctx)?;
    let settings = format!("{}/settings", ctx.cfg.frontend_base());
    let failed = || Redirect::to(&format!("{}?google=error", settings));

    if let Some(err) = q.error.as_deref() {
        tracing::info!(error = %err, "google_consent_declined");
        return Ok(failed());
    }
    let user_id = match q.state.as_deref().map(|s| verify_state(&ctx.cfg, s)) {
        Some(Ok(id)) => id,
        Some(Err(e)) => {
            tracing::warn!(error = ?e, "google_callback_bad_state");
            return Ok(failed());
        }
        None => return Ok(failed()),
    };
    let Some(code) = q.code.as_deref().filter(|c| !c.is_empty()) else {
        return Ok(failed());
    };

    let store = ctx.credential_store();
    let res = CompleteConnect {
        provider: google.provider.as_ref(),
        store: store.as_ref(),
    }
    .execute(user_id, code)
    .await;
    match res {
        Ok(_) => Ok(Redirect::to(&format!("{}?google=connected", settings))),
        Err(AppError::Upstream(e) | AppError::Internal(e)) => {
            tracing::error!(error = ?e, %user_id, "google_connect_failed");
            Ok(failed())
        }
        Err(e) => {
            tracing::warn!(error = %e, %user_id, "google_connect_rejected");
            Ok(failed())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/integrations/google/status",
    tag = "Integrations",
    responses((status = 200, body = ConnectionStatusResponse))
)]
pub async fn status(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<ConnectionStatusResponse>, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let google = google(&ctx)?;
    let store = ctx.credential_store();
    let s = GetConnectionStatus {
        store: store.as_ref(),
        provider: google.provider.provider_name(),
    }
    .execute(user_id)
    .await?;
    Ok(Json(ConnectionStatusResponse {
        connected: s.connected,
        connected_at: s.connected_at,
        expires_at: s.expires_at,
    }))
}

#[utoipa::path(
    post,
    path = "/api/integrations/google/refresh",
    tag = "Integrations",
    responses(
        (status = 200, body = RefreshResponse),
        (status = 403, description = "Refresh token rejected; reconnect required", body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn refresh(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<RefreshResponse>, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let google = google(&ctx)?;
    let store = ctx.credential_store();
    let provider = google.provider.provider_name();
    let cred = store
        .get(user_id, provider)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| ApiError::not_found("google account not connected"))?;
    let refresh_token = cred.refresh_token.ok_or(ApiError::ReconnectRequired)?;
    let out = RefreshToken {
        provider: google.provider.as_ref(),
        store: store.as_ref(),
    }
    .execute(user_id, &refresh_token)
    .await?;
    Ok(Json(RefreshResponse {
        access_token: out.access_token,
        expires_at: out.expires_at,
    }))
}

fn valid_folder_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[utoipa::path(
    get,
    path = "/api/integrations/google/files",
    tag = "Integrations",
    params(FilesQuery),
    responses(
        (status = 200, body = [DriveFileItem]),
        (status = 403, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn list_files(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Query(q): Query<FilesQuery>,
) -> Result<Json<Vec<DriveFileItem>>, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let google = google(&ctx)?;
    let folder_id = q.folder_id.as_deref().filter(|f| !f.is_empty());
    if folder_id.is_some_and(|f| !valid_folder_id(f)) {
        return Err(ApiError::bad_request("invalid folder_id"));
    }
    let store = ctx.credential_store();
    let files = ListDriveFiles {
        provider: google.provider.as_ref(),
        store: store.as_ref(),
        drive: google.drive.as_ref(),
    }
    .execute(user_id, folder_id)
    .await?;
    Ok(Json(
        files
            .into_iter()
            .map(|f| DriveFileItem {
                id: f.id,
                name: f.name,
                mime_type: f.mime_type,
                size: f.size,
                modified_at: f.modified_at,
            })
            .collect(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/integrations/google",
    tag = "Integrations",
    responses(
        (status = 204),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn disconnect(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<StatusCode, ApiError> {
    let user_id = authenticate(&ctx.cfg, &bearer)?;
    let google = google(&ctx)?;
    let store = ctx.credential_store();
    Disconnect {
        provider: google.provider.as_ref(),
        store: store.as_ref(),
    }
    .execute(user_id)
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
