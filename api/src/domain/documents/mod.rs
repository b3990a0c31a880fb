pub mod document;
pub mod permissions;
