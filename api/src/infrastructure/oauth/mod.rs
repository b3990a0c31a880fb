pub mod google_drive_reqwest;
pub mod google_oauth_reqwest;

pub use google_drive_reqwest::GoogleDriveClient;
pub use google_oauth_reqwest::GoogleOAuthProvider;
