use uuid::Uuid;

use crate::domain::documents::permissions::Permission;

#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub storage_key: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub storage_key: String,
}

/// A document as seen by a grantee, together with the grant that exposes it.
#[derive(Debug, Clone)]
pub struct SharedDocument {
    pub document: Document,
    /// `None` when the share was created without an explicit permission list.
    pub permissions: Option<Vec<Permission>>,
    pub shared_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct Share {
    pub document_id: Uuid,
    pub grantee_id: Uuid,
    pub grantee_email: String,
    pub permissions: Option<Vec<Permission>>,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub fn sanitize_filename(name: &str) -> String {
    let mut s = name.trim().to_string();
    let invalid = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];
    for ch in invalid {
        s = s.replace(ch, "-");
    }
    s = s.replace(' ', "_");
    if s.len() > 100 {
        let mut cut = 100;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
    }
    if s.is_empty() || s.chars().all(|c| c == '.') {
        s = "file.bin".into();
    }
    s
}

/// Object-store key for a document: `<owner>/<document>/<sanitized name>`.
pub fn object_key(owner_id: Uuid, document_id: Uuid, filename: &str) -> String {
    format!("{}/{}/{}", owner_id, document_id, sanitize_filename(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_path_separators_and_dots() {
        assert_eq!(sanitize_filename("../etc/passwd"), "..-etc-passwd");
        assert_eq!(sanitize_filename(".."), "file.bin");
        assert_eq!(sanitize_filename("  "), "file.bin");
        assert_eq!(sanitize_filename("Q3 report.pdf"), "Q3_report.pdf");
    }

    #[test]
    fn key_is_scoped_by_owner_and_document() {
        let owner = Uuid::new_v4();
        let doc = Uuid::new_v4();
        let key = object_key(owner, doc, "a/b.txt");
        assert_eq!(key, format!("{}/{}/a-b.txt", owner, doc));
    }
}
