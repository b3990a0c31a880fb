use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use docshare::application::ports::storage_port::StoragePort;
use docshare::bootstrap::app_context::{AppContext, AppServices, GoogleServices};
use docshare::bootstrap::config::{Config, StorageBackend};
use docshare::infrastructure::crypto::TokenCipher;
use docshare::infrastructure::db::repositories::{
    access_repository_sqlx::SqlxAccessRepository,
    credential_repository_sqlx::SqlxCredentialRepository,
    document_repository_sqlx::SqlxDocumentRepository, shares_repository_sqlx::SqlxSharesRepository,
    user_repository_sqlx::SqlxUserRepository,
};
use docshare::infrastructure::oauth::{GoogleDriveClient, GoogleOAuthProvider};
use docshare::infrastructure::storage::{FsStorage, S3Storage, UrlSigner};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            docshare::presentation::http::auth::register,
            docshare::presentation::http::auth::login,
            docshare::presentation::http::auth::logout,
            docshare::presentation::http::auth::me,
            docshare::presentation::http::documents::upload_document,
            docshare::presentation::http::documents::list_documents,
            docshare::presentation::http::documents::get_document,
            docshare::presentation::http::documents::check_document_access,
            docshare::presentation::http::documents::rename_document,
            docshare::presentation::http::documents::delete_document,
            docshare::presentation::http::shares::create_share,
            docshare::presentation::http::shares::list_document_shares,
            docshare::presentation::http::shares::delete_share,
            docshare::presentation::http::shares::list_incoming_shares,
            docshare::presentation::http::integrations::connect,
            docshare::presentation::http::integrations::callback,
            docshare::presentation::http::integrations::status,
            docshare::presentation::http::integrations::refresh,
            docshare::presentation::http::integrations::list_files,
            docshare::presentation::http::integrations::disconnect,
            docshare::presentation::http::health::health,
        ),
        components(schemas(
            docshare::presentation::http::error::ErrorResponse,
            docshare::presentation::http::auth::RegisterRequest,
            docshare::presentation::http::auth::LoginRequest,
            docshare::presentation::http::auth::LoginResponse,
            docshare::presentation::http::auth::UserResponse,
            docshare::presentation::http::documents::DocumentResponse,
            docshare::presentation::http::documents::SharedDocumentResponse,
            docshare::presentation::http::documents::DocumentListResponse,
            docshare::presentation::http::documents::DocumentDetailResponse,
            docshare::presentation::http::documents::AccessResponse,
            docshare::presentation::http::documents::RenameDocumentRequest,
            docshare::presentation::http::documents::UploadDocumentMultipart,
            docshare::presentation::http::shares::CreateShareRequest,
            docshare::presentation::http::shares::ShareItem,
            docshare::presentation::http::shares::IncomingShareItem,
            docshare::presentation::http::integrations::ConnectResponse,
            docshare::presentation::http::integrations::ConnectionStatusResponse,
            docshare::presentation::http::integrations::RefreshResponse,
            docshare::presentation::http::integrations::DriveFileItem,
            docshare::presentation::http::health::HealthResp,
            docshare::domain::documents::permissions::Permission,
            docshare::domain::documents::permissions::AccessLevel,
        )),
        tags(
            (name = "Auth", description = "Authentication"),
            (name = "Documents", description = "Uploaded documents and access checks"),
            (name = "Sharing", description = "Document sharing"),
            (name = "Integrations", description = "Google Drive connection"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

fn cors_layer(cfg: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::DELETE,
            http::Method::PATCH,
            http::Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]);
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        // Production refuses to start without FRONTEND_URL; this is the development path.
        _ => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "docshare=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        port = cfg.api_port,
        storage = ?cfg.storage_backend,
        google = cfg.google.is_some(),
        production = cfg.is_production,
        "starting docshare"
    );

    // Database
    let pool = docshare::infrastructure::db::connect_pool(&cfg.database_url).await?;
    docshare::infrastructure::db::migrate(&pool).await?;

    let (storage_port, upload_signer): (Arc<dyn StoragePort>, Option<UrlSigner>) =
        match cfg.storage_backend {
            StorageBackend::Filesystem => {
                if let Err(e) = tokio::fs::create_dir_all(&cfg.storage_root).await {
                    tracing::warn!(error = ?e, dir = %cfg.storage_root, "storage_root_create_failed");
                }
                let signer = UrlSigner::new(cfg.jwt_secret_pem.clone(), cfg.public_base());
                let fs: Arc<dyn StoragePort> =
                    Arc::new(FsStorage::new(&cfg.storage_root, signer.clone()));
                (fs, Some(signer))
            }
            StorageBackend::S3 => {
                let s3: Arc<dyn StoragePort> = Arc::new(S3Storage::new(&cfg).await?);
                (s3, None)
            }
        };

    let shares_repo = Arc::new(SqlxSharesRepository::new(pool.clone()));
    let credential_store = Arc::new(SqlxCredentialRepository::new(
        pool.clone(),
        TokenCipher::new(&cfg.encryption_key),
    ));
    let google = cfg.google.clone().map(|g| GoogleServices {
        provider: Arc::new(GoogleOAuthProvider::new(g)),
        drive: Arc::new(GoogleDriveClient::new()),
    });

    let services = AppServices::new(
        Arc::new(SqlxDocumentRepository::new(pool.clone())),
        shares_repo,
        Arc::new(SqlxAccessRepository::new(pool.clone())),
        Arc::new(SqlxUserRepository::new(pool.clone())),
        storage_port,
        upload_signer,
        credential_store,
        google,
    );
    let ctx = AppContext::new(cfg.clone(), services);

    let ops = axum::Router::new()
        .nest(
            "/api",
            docshare::presentation::http::health::routes(pool.clone()),
        )
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()));
    let app = docshare::presentation::http::router(ctx, ops)
        .layer(cors_layer(&cfg))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().path().to_string();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "shutdown_signal_failed");
    }
}
