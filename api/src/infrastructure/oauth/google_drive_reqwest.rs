use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::application::ports::drive_client::DriveClient;
use crate::application::ports::oauth_provider::OAuthError;
use crate::domain::integrations::oauth::DriveFile;

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileEntry {
    id: String,
    name: String,
    mime_type: String,
    // Drive sends int64 values as strings
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    modified_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

pub struct GoogleDriveClient {
    client: reqwest::Client,
}

impl GoogleDriveClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for GoogleDriveClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parents_query(folder_id: Option<&str>) -> String {
    let parent = folder_id
        .map(|f| f.replace('\\', "\\\\").replace('\'', "\\'"))
        .unwrap_or_else(|| "root".to_string());
    format!("'{}' in parents and trashed = false", parent)
}

#[async_trait]
impl DriveClient for GoogleDriveClient {
    async fn list_files(
        &self,
        access_token: &str,
        folder_id: Option<&str>,
    ) -> Result<Vec<DriveFile>, OAuthError> {
        let query = parents_query(folder_id);
        let resp = self
            .client
            .get(FILES_URL)
            .bearer_auth(access_token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name,mimeType,size,modifiedTime)"),
                ("pageSize", "100"),
                ("orderBy", "folder,name"),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;
        match resp.status() {
            StatusCode::UNAUTHORIZED => return Err(OAuthError::Unauthorized),
            s if !s.is_success() => {
                return Err(OAuthError::Transport(format!(
                    "drive returned {}",
                    s.as_u16()
                )));
            }
            _ => {}
        }
        let list: FileList = resp
            .json()
            .await
            .map_err(|e| OAuthError::Transport(format!("malformed drive response: {e}")))?;
        Ok(list.files.into_iter().map(into_drive_file).collect())
    }
}

fn into_drive_file(f: FileEntry) -> DriveFile {
    DriveFile {
        id: f.id,
        name: f.name,
        mime_type: f.mime_type,
        size: f.size.and_then(|s| s.parse().ok()),
        modified_at: f.modified_time,
    }
}
