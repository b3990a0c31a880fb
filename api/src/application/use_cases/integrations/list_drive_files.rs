use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::credential_store::CredentialStore;
use crate::application::ports::drive_client::DriveClient;
use crate::application::ports::oauth_provider::{OAuthError, OAuthProvider};
use crate::application::use_cases::integrations::ensure_access_token::EnsureAccessToken;
use crate::application::use_cases::integrations::refresh_token::RefreshToken;
use crate::domain::integrations::oauth::DriveFile;

pub struct ListDriveFiles<'a, P, C, D>
where
    P: OAuthProvider + ?Sized,
    C: CredentialStore + ?Sized,
    D: DriveClient + ?Sized,
{
    pub provider: &'a P,
    pub store: &'a C,
    pub drive: &'a D,
}

impl<'a, P, C, D> ListDriveFiles<'a, P, C, D>
where
    P: OAuthProvider + ?Sized,
    C: CredentialStore + ?Sized,
    D: DriveClient + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, folder_id: Option<&str>) -> AppResult<Vec<DriveFile>> {
        let token = EnsureAccessToken {
            provider: self.provider,
            store: self.store,
        }
        .execute(user_id)
        .await?;

        match self.drive.list_files(&token.access_token, folder_id).await {
            Ok(files) => Ok(files),
            // Revoked before its declared expiry: spend the single refresh attempt.
            Err(OAuthError::Unauthorized) if !token.refreshed => {
                let provider = self.provider.provider_name();
                let refresh_token = self
                    .store
                    .get(user_id, provider)
                    .await?
                    .and_then(|c| c.refresh_token)
                    .ok_or(AppError::ReconnectRequired)?;
                let fresh = RefreshToken {
                    provider: self.provider,
                    store: self.store,
                }
                .execute(user_id, &refresh_token)
                .await?;
                Ok(self.drive.list_files(&fresh.access_token, folder_id).await?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{FakeDrive, FakeOAuthProvider, InMemoryCredentials};
    use crate::domain::integrations::oauth::{GOOGLE_PROVIDER, OAuthCredential};
    use chrono::{Duration, Utc};

    async fn seed(store: &InMemoryCredentials, user: Uuid, expires_in: Duration) {
        store
            .save(
                user,
                GOOGLE_PROVIDER,
                &OAuthCredential {
                    access_token: "stored-access".into(),
                    refresh_token: Some("refresh-1".into()),
                    expires_at: Some(Utc::now() + expires_in),
                    connected_at: Utc::now(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn lists_with_stored_token() {
        let user = Uuid::new_v4();
        let store = InMemoryCredentials::default();
        seed(&store, user, Duration::hours(1)).await;
        let provider = FakeOAuthProvider::new("refresh-1");
        let drive = FakeDrive::accepting(&["stored-access"]);
        let files = ListDriveFiles {
            provider: &provider,
            store: &store,
            drive: &drive,
        }
        .execute(user, None)
        .await
        .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(provider.refresh_count(), 0);
    }

    #[tokio::test]
    async fn rejected_token_triggers_one_refresh_and_retry() {
        let user = Uuid::new_v4();
        let store = InMemoryCredentials::default();
        seed(&store, user, Duration::hours(1)).await;
        let provider = FakeOAuthProvider::new("refresh-1");
        let drive = FakeDrive::accepting(&["refreshed-access-1"]);
        let files = ListDriveFiles {
            provider: &provider,
            store: &store,
            drive: &drive,
        }
        .execute(user, None)
        .await
        .unwrap();
        assert_eq!(files[0].name, "report.pdf");
        assert_eq!(provider.refresh_count(), 1);
        assert_eq!(
            *drive.seen.lock().unwrap(),
            vec!["stored-access".to_string(), "refreshed-access-1".to_string()]
        );
    }

    #[tokio::test]
    async fn no_second_refresh_within_one_request() {
        let user = Uuid::new_v4();
        let store = InMemoryCredentials::default();
        seed(&store, user, Duration::minutes(-1)).await;
        let provider = FakeOAuthProvider::new("refresh-1");
        let drive = FakeDrive::accepting(&[]);
        let res = ListDriveFiles {
            provider: &provider,
            store: &store,
            drive: &drive,
        }
        .execute(user, None)
        .await;
        assert!(matches!(res, Err(AppError::ReconnectRequired)));
        assert_eq!(provider.refresh_count(), 1);
    }
}
