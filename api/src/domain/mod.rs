pub mod documents;
pub mod integrations;
