pub mod crypto;
pub mod db;
pub mod oauth;
pub mod storage;
