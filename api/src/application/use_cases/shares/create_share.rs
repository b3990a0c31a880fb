use uuid::Uuid;

use crate::application::access;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::access_repository::AccessRepository;
use crate::application::ports::shares_repository::SharesRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::use_cases::auth::register::normalize_email;
use crate::domain::documents::document::Share;
use crate::domain::documents::permissions::{self, Permission};

pub struct CreateShare<'a, R, U, A>
where
    R: SharesRepository + ?Sized,
    U: UserRepository + ?Sized,
    A: AccessRepository + ?Sized,
{
    pub repo: &'a R,
    pub users: &'a U,
    pub access: &'a A,
}

impl<'a, R, U, A> CreateShare<'a, R, U, A>
where
    R: SharesRepository + ?Sized,
    U: UserRepository + ?Sized,
    A: AccessRepository + ?Sized,
{
    /// An absent or empty permission list is stored as unspecified.
    pub async fn execute(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        grantee_email: &str,
        requested: Option<Vec<Permission>>,
    ) -> AppResult<Share> {
        let email = normalize_email(grantee_email)
            .ok_or_else(|| AppError::validation("invalid email"))?;
        let perms = match requested {
            Some(p) if !p.is_empty() => {
                if let Some(bad) = p.iter().find(|p| !p.is_grantable()) {
                    return Err(AppError::validation(format!(
                        "permission '{}' cannot be shared",
                        bad.as_str()
                    )));
                }
                Some(permissions::normalize(&p))
            }
            _ => None,
        };

        access::require_owner(self.access, document_id, owner_id).await?;

        let grantee = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found("no user with that email"))?;
        if grantee.id == owner_id {
            return Err(AppError::validation("cannot share a document with yourself"));
        }

        let share = self
            .repo
            .upsert_share(owner_id, document_id, grantee.id, perms.as_deref())
            .await?;
        tracing::info!(%document_id, grantee_id = %grantee.id, "share_created");
        Ok(share)
    }
}
