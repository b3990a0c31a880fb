pub mod auth;
pub mod documents;
pub mod integrations;
pub mod shares;
