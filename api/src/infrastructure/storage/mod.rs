pub mod fs_storage;
pub mod s3_storage;
pub mod signing;

pub use fs_storage::FsStorage;
pub use s3_storage::S3Storage;
pub use signing::UrlSigner;
