pub mod access_repository;
pub mod credential_store;
pub mod document_repository;
pub mod drive_client;
pub mod oauth_provider;
pub mod shares_repository;
pub mod storage_port;
pub mod user_repository;
