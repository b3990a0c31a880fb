pub mod create_share;
pub mod delete_share;
pub mod list_document_shares;
pub mod list_incoming;
