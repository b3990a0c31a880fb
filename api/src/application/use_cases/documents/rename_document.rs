use uuid::Uuid;

use crate::application::access;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::access_repository::AccessRepository;
use crate::application::ports::document_repository::DocumentRepository;
use crate::domain::documents::document::Document;
use crate::domain::documents::permissions::Permission;

const MAX_NAME_LEN: usize = 255;

pub struct RenameDocument<'a, R, A>
where
    R: DocumentRepository + ?Sized,
    A: AccessRepository + ?Sized,
{
    pub repo: &'a R,
    pub access: &'a A,
}

impl<'a, R, A> RenameDocument<'a, R, A>
where
    R: DocumentRepository + ?Sized,
    A: AccessRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, id: Uuid, name: &str) -> AppResult<Document> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::validation(format!(
                "name must be 1..={} characters",
                MAX_NAME_LEN
            )));
        }
        access::require(self.access, id, user_id, Permission::Write).await?;
        self.repo
            .rename(id, name)
            .await?
            .ok_or_else(|| AppError::not_found("document not found"))
    }
}
