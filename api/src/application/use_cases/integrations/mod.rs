pub mod connect;
pub mod disconnect;
pub mod ensure_access_token;
pub mod list_drive_files;
pub mod refresh_token;
pub mod status;
