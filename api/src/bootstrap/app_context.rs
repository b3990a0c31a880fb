use std::sync::Arc;

use crate::application::ports::access_repository::AccessRepository;
use crate::application::ports::credential_store::CredentialStore;
use crate::application::ports::document_repository::DocumentRepository;
use crate::application::ports::drive_client::DriveClient;
use crate::application::ports::oauth_provider::OAuthProvider;
use crate::application::ports::shares_repository::SharesRepository;
use crate::application::ports::storage_port::StoragePort;
use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::config::Config;
use crate::infrastructure::storage::UrlSigner;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

/// Google is optional; without it the integration routes answer 404.
#[derive(Clone)]
pub struct GoogleServices {
    pub provider: Arc<dyn OAuthProvider>,
    pub drive: Arc<dyn DriveClient>,
}

#[derive(Clone)]
pub struct AppServices {
    document_repo: Arc<dyn DocumentRepository>,
    shares_repo: Arc<dyn SharesRepository>,
    access_repo: Arc<dyn AccessRepository>,
    user_repo: Arc<dyn UserRepository>,
    storage_port: Arc<dyn StoragePort>,
    upload_signer: Option<UrlSigner>,
    credential_store: Arc<dyn CredentialStore>,
    google: Option<GoogleServices>,
}

impl AppServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        document_repo: Arc<dyn DocumentRepository>,
        shares_repo: Arc<dyn SharesRepository>,
        access_repo: Arc<dyn AccessRepository>,
        user_repo: Arc<dyn UserRepository>,
        storage_port: Arc<dyn StoragePort>,
        upload_signer: Option<UrlSigner>,
        credential_store: Arc<dyn CredentialStore>,
        google: Option<GoogleServices>,
    ) -> Self {
        Self {
            document_repo,
            shares_repo,
            access_repo,
            user_repo,
            storage_port,
            upload_signer,
            credential_store,
            google,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn document_repo(&self) -> Arc<dyn DocumentRepository> {
        self.services.document_repo.clone()
    }

    pub fn shares_repo(&self) -> Arc<dyn SharesRepository> {
        self.services.shares_repo.clone()
    }

    pub fn access_repo(&self) -> Arc<dyn AccessRepository> {
        self.services.access_repo.clone()
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn storage_port(&self) -> Arc<dyn StoragePort> {
        self.services.storage_port.clone()
    }

    /// Present only when objects are served by this process.
    pub fn upload_signer(&self) -> Option<&UrlSigner> {
        self.services.upload_signer.as_ref()
    }

    pub fn credential_store(&self) -> Arc<dyn CredentialStore> {
        self.services.credential_store.clone()
    }

    pub fn google(&self) -> Option<GoogleServices> {
        self.services.google.clone()
    }
}
