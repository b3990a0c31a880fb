use uuid::Uuid;

use crate::application::errors::AppResult;
use crate::application::ports::credential_store::CredentialStore;

#[derive(Debug, Clone)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub connected_at: Option<chrono::DateTime<chrono::Utc>>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub struct GetConnectionStatus<'a, C: CredentialStore + ?Sized> {
    pub store: &'a C,
    pub provider: &'a str,
}

impl<'a, C: CredentialStore + ?Sized> GetConnectionStatus<'a, C> {
    pub async fn execute(&self, user_id: Uuid) -> AppResult<ConnectionStatus> {
        let cred = self.store.get(user_id, self.provider).await?;
        Ok(ConnectionStatus {
            connected: cred.is_some(),
            connected_at: cred.as_ref().map(|c| c.connected_at),
            expires_at: cred.and_then(|c| c.expires_at),
        })
    }
}
