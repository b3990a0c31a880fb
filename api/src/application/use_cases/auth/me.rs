use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct GetMe<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> GetMe<'a, R> {
    // A valid session for a deleted account is treated as no session.
    pub async fn execute(&self, id: Uuid) -> AppResult<UserRow> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::Unauthenticated)
    }
}
