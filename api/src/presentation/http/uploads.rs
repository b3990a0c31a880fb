use std::collections::HashMap;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::error::ApiError;

/// Serves locally stored objects to holders of a signed link.
pub async fn serve_upload(
    State(ctx): State<AppContext>,
    Path(key): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let signer = ctx
        .upload_signer()
        .ok_or_else(|| ApiError::not_found("not found"))?;
    let token = params.get("token").ok_or(ApiError::Unauthorized)?;
    signer.verify(&key, token).map_err(|e| {
        tracing::debug!(error = ?e, "upload_token_rejected");
        ApiError::Unauthorized
    })?;

    let data = ctx
        .storage_port()
        .read_object(&key)
        .await
        .map_err(|_| ApiError::not_found("not found"))?;

    // Determine content type from extension using mime_guess (fallback to octet-stream)
    let content_type = mime_guess::from_path(&key)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    let file_name = key.rsplit('/').next().unwrap_or("download");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    if let Ok(v) = HeaderValue::from_str(&format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )) {
        headers.insert(header::CONTENT_DISPOSITION, v);
    }
    Ok((headers, data).into_response())
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/*key", get(serve_upload))
        .with_state(ctx)
}
