use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::application::use_cases::auth::register::normalize_email;

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    /// Unknown email and wrong password fail the same way.
    pub async fn execute(&self, email: &str, password: &str) -> AppResult<UserRow> {
        let Some(email) = normalize_email(email) else {
            return Err(AppError::Unauthenticated);
        };
        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AppError::Unauthenticated)?;
        let stored = user
            .password_hash
            .as_deref()
            .ok_or(AppError::Unauthenticated)?;
        let hash = PasswordHash::new(stored).map_err(|e| {
            anyhow::anyhow!("stored password hash for {} is malformed: {}", user.id, e)
        })?;
        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .map_err(|_| AppError::Unauthenticated)?;
        Ok(UserRow {
            password_hash: None,
            ..user
        })
    }
}
