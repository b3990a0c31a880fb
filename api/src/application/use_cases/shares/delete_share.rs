use uuid::Uuid;

use crate::application::access;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::access_repository::AccessRepository;
use crate::application::ports::shares_repository::SharesRepository;

pub struct DeleteShare<'a, R, A>
where
    R: SharesRepository + ?Sized,
    A: AccessRepository + ?Sized,
{
    pub repo: &'a R,
    pub access: &'a A,
}

impl<'a, R, A> DeleteShare<'a, R, A>
where
    R: SharesRepository + ?Sized,
    A: AccessRepository + ?Sized,
{
    pub async fn execute(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        grantee_id: Uuid,
    ) -> AppResult<()> {
        access::require_owner(self.access, document_id, owner_id).await?;
        if !self.repo.delete_share(document_id, grantee_id).await? {
            return Err(AppError::not_found("share not found"));
        }
        tracing::info!(%document_id, %grantee_id, "share_revoked");
        Ok(())
    }
}
