use axum::Router;
use axum::extract::DefaultBodyLimit;

use crate::bootstrap::app_context::AppContext;

pub mod auth;
pub mod documents;
pub mod error;
pub mod health;
pub mod integrations;
pub mod shares;
pub mod uploads;


/// Application routes plus `ops` (health, docs), sharing the body limit and JSON errors.
pub fn router(ctx: AppContext, ops: Router) -> Router {
    let body_limit = ctx.cfg.request_body_limit();
    Router::new()
        .nest("/api/auth", auth::routes(ctx.clone()))
        .nest(
            "/api",
            documents::routes(ctx.clone()).merge(shares::routes(ctx.clone())),
        )
        .nest("/api/integrations/google", integrations::routes(ctx.clone()))
        .nest("/api/uploads", uploads::routes(ctx))
        .merge(ops)
        .fallback(error::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::map_response(error::json_errors))
}
