use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use once_cell::sync::Lazy;
use password_hash::rand_core::OsRng;
use regex::Regex;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::user_repository::{UserRepository, UserRow};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

const MIN_PASSWORD_LEN: usize = 8;

/// Lowercased, trimmed email, or None when it does not look like an address.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    if EMAIL_RE.is_match(&email) {
        Some(email)
    } else {
        None
    }
}

pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    pub async fn execute(&self, req: &RegisterRequest) -> AppResult<UserRow> {
        let email =
            normalize_email(&req.email).ok_or_else(|| AppError::validation("invalid email"))?;
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name is required"));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();
        self.repo
            .create_user(&email, name, &hash)
            .await?
            .ok_or_else(|| AppError::Conflict("email already registered".into()))
    }
}
