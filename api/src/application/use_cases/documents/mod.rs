pub mod delete_document;
pub mod get_document;
pub mod list_documents;
pub mod rename_document;
pub mod upload_document;
