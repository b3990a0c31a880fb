use uuid::Uuid;

use crate::application::access;
use crate::application::errors::AppResult;
use crate::application::ports::access_repository::AccessRepository;
use crate::application::ports::shares_repository::SharesRepository;
use crate::domain::documents::document::Share;

pub struct ListDocumentShares<'a, R, A>
where
    R: SharesRepository + ?Sized,
    A: AccessRepository + ?Sized,
{
    pub repo: &'a R,
    pub access: &'a A,
}

impl<'a, R, A> ListDocumentShares<'a, R, A>
where
    R: SharesRepository + ?Sized,
    A: AccessRepository + ?Sized,
{
    pub async fn execute(&self, owner_id: Uuid, document_id: Uuid) -> AppResult<Vec<Share>> {
        access::require_owner(self.access, document_id, owner_id).await?;
        let mut shares = self.repo.list_document_shares(document_id).await?;
        shares.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(shares)
    }
}
