use async_trait::async_trait;

use crate::application::ports::oauth_provider::OAuthError;
use crate::domain::integrations::oauth::DriveFile;

#[async_trait]
pub trait DriveClient: Send + Sync {
    async fn list_files(
        &self,
        access_token: &str,
        folder_id: Option<&str>,
    ) -> Result<Vec<DriveFile>, OAuthError>;
}
