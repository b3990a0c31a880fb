use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    routing::{get, post},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::ports::user_repository::UserRow;
use crate::application::use_cases::auth::login::Login;
use crate::application::use_cases::auth::me::GetMe;
use crate::application::use_cases::auth::register::{Register, RegisterRequest as NewAccount};
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::presentation::http::error::{ApiError, ErrorResponse};

const SESSION_COOKIE: &str = "access_token";

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<UserRow> for UserResponse {
    fn from(u: UserRow) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: Uuid,
    iat: usize,
    exp: usize,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/auth/register", tag = "Auth", request_body = RegisterRequest, security(()), responses(
    (status = 201, body = UserResponse),
    (status = 400, body = ErrorResponse),
    (status = 409, body = ErrorResponse)
))]
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let repo = ctx.user_repo();
    let user = Register {
        repo: repo.as_ref(),
    }
    .execute(&NewAccount {
        email: req.email,
        name: req.name,
        password: req.password,
    })
    .await?;
    tracing::info!(user_id = %user.id, "user_registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "Auth", request_body = LoginRequest, security(()), responses(
    (status = 200, body = LoginResponse),
    (status = 401, body = ErrorResponse)
))]
pub async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let repo = ctx.user_repo();
    let user = Login {
        repo: repo.as_ref(),
    }
    .execute(&req.email, &req.password)
    .await?;
    let token = issue_token(&ctx.cfg, user.id).map_err(|e| {
        tracing::error!(error = ?e, "jwt_encode_failed");
        ApiError::Internal
    })?;

    let mut headers = HeaderMap::new();
    let max_age = ctx.cfg.jwt_expires_secs.max(0);
    if let Ok(v) = session_cookie(&ctx.cfg, &token, max_age) {
        headers.insert(header::SET_COOKIE, v);
    }
    Ok((
        headers,
        Json(LoginResponse {
            access_token: token,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(get, path = "/api/auth/me", tag = "Auth", responses(
    (status = 200, body = UserResponse),
    (status = 401, body = ErrorResponse)
))]
pub async fn me(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<UserResponse>, ApiError> {
    let id = authenticate(&ctx.cfg, &bearer)?;
    let repo = ctx.user_repo();
    let user = GetMe {
        repo: repo.as_ref(),
    }
    .execute(id)
    .await?;
    Ok(Json(user.into()))
}

#[utoipa::path(post, path = "/api/auth/logout", tag = "Auth", security(()), responses((status = 204)))]
pub async fn logout(State(ctx): State<AppContext>) -> (HeaderMap, StatusCode) {
    let mut headers = HeaderMap::new();
    if let Ok(v) = session_cookie(&ctx.cfg, "", 0) {
        headers.insert(header::SET_COOKIE, v);
    }
    (headers, StatusCode::NO_CONTENT)
}

/// Raw session token from `Authorization: Bearer` or the session cookie.
pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        token_from_headers(&parts.headers)
            .map(Bearer)
            .ok_or(ApiError::Unauthorized)
    }
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let header_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(t) = header_token {
        return Some(t.to_string());
    }
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|h| cookie_value(h, SESSION_COOKIE))
}

pub fn issue_token(cfg: &Config, user_id: Uuid) -> anyhow::Result<String> {
    let now = chrono::Utc::now().timestamp().max(0) as usize;
    let claims = SessionClaims {
        sub: user_id,
        iat: now,
        exp: now + cfg.jwt_expires_secs.max(0) as usize,
    };
    Ok(jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.jwt_secret_pem.as_bytes()),
    )?)
}

/// Verifies the session token and returns the caller's user id.
pub fn authenticate(cfg: &Config, bearer: &Bearer) -> Result<Uuid, ApiError> {
    jsonwebtoken::decode::<SessionClaims>(
        &bearer.0,
        &DecodingKey::from_secret(cfg.jwt_secret_pem.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.sub)
    .map_err(|e| {
        tracing::debug!(error = %e, "session_token_rejected");
        ApiError::Unauthorized
    })
}

fn cookie_value(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(k, v)| k.trim() == name && !v.trim().is_empty())
        .map(|(_, v)| v.trim().to_string())
}

// Secure only when the frontend is served over TLS.
fn session_cookie(
    cfg: &Config,
    value: &str,
    max_age_secs: i64,
) -> Result<HeaderValue, header::InvalidHeaderValue> {
    let secure = cfg
        .frontend_url
        .as_deref()
        .is_some_and(|u| u.starts_with("https://"));
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly{}; Path=/; Max-Age={}; SameSite=Lax",
        SESSION_COOKIE,
        value,
        if secure { "; Secure" } else { "" },
        max_age_secs
    ))
}
