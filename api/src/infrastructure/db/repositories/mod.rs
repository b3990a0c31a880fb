pub mod access_repository_sqlx;
pub mod credential_repository_sqlx;
pub mod document_repository_sqlx;
pub mod shares_repository_sqlx;
pub mod user_repository_sqlx;
