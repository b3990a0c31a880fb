use uuid::Uuid;

use crate::application::errors::AppResult;
use crate::application::ports::shares_repository::SharesRepository;
use crate::domain::documents::document::SharedDocument;

pub struct ListIncomingShares<'a, R: SharesRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: SharesRepository + ?Sized> ListIncomingShares<'a, R> {
    pub async fn execute(&self, user_id: Uuid) -> AppResult<Vec<SharedDocument>> {
        let mut items = self.repo.list_shared_with(user_id).await?;
        items.sort_by(|a, b| b.shared_at.cmp(&a.shared_at));
        Ok(items)
    }
}
