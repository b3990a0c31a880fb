use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Delete,
    Share,
}

impl Permission {
    pub const OWNER: [Permission; 4] = [
        Permission::Read,
        Permission::Write,
        Permission::Delete,
        Permission::Share,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Delete => "delete",
            Permission::Share => "share",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Permission::Read),
            "write" => Some(Permission::Write),
            "delete" => Some(Permission::Delete),
            "share" => Some(Permission::Share),
            _ => None,
        }
    }

    /// Whether a share record may carry this permission.
    pub fn is_grantable(&self) -> bool {
        matches!(self, Permission::Read | Permission::Write)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Owner,
    Shared,
}

/// Normalised permission list: sorted, deduplicated.
pub fn normalize(perms: &[Permission]) -> Vec<Permission> {
    let mut out = perms.to_vec();
    out.sort();
    out.dedup();
    out
}

/// Permissions for a share whose record did not specify any.
pub fn default_shared() -> Vec<Permission> {
    vec![Permission::Read]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Permission::OWNER).unwrap();
        assert_eq!(json, r#"["read","write","delete","share"]"#);
        let level = serde_json::to_string(&AccessLevel::Shared).unwrap();
        assert_eq!(level, r#""shared""#);
    }

    #[test]
    fn only_read_and_write_are_grantable() {
        assert!(Permission::Read.is_grantable());
        assert!(Permission::Write.is_grantable());
        assert!(!Permission::Delete.is_grantable());
        assert!(!Permission::Share.is_grantable());
    }

    #[test]
    fn normalize_sorts_and_dedups() {
        let perms = normalize(&[Permission::Write, Permission::Read, Permission::Write]);
        assert_eq!(perms, vec![Permission::Read, Permission::Write]);
        assert_eq!(Permission::parse("write"), Some(Permission::Write));
        assert_eq!(Permission::parse("admin"), None);
    }
}
