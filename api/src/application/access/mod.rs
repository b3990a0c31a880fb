use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::access_repository::AccessRepository;
use crate::domain::documents::permissions::{self, AccessLevel, Permission};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAccess {
    pub has_access: bool,
    pub access_level: Option<AccessLevel>,
    pub permissions: Vec<Permission>,
    pub owner_id: Option<Uuid>,
}

impl DocumentAccess {
    pub fn denied() -> Self {
        Self {
            has_access: false,
            access_level: None,
            permissions: Vec::new(),
            owner_id: None,
        }
    }

    fn owner(user_id: Uuid) -> Self {
        Self {
            has_access: true,
            access_level: Some(AccessLevel::Owner),
            permissions: Permission::OWNER.to_vec(),
            owner_id: Some(user_id),
        }
    }

    fn shared(owner_id: Uuid, perms: Option<Vec<Permission>>) -> Self {
        Self {
            has_access: true,
            access_level: Some(AccessLevel::Shared),
            permissions: perms.unwrap_or_else(permissions::default_shared),
            owner_id: Some(owner_id),
        }
    }

    pub fn is_owner(&self) -> bool {
        self.access_level == Some(AccessLevel::Owner)
    }

    pub fn allows(&self, perm: Permission) -> bool {
        self.has_access && self.permissions.contains(&perm)
    }

    // Sharing and deletion are never delegated.
    pub fn can_share(&self) -> bool {
        self.is_owner()
    }

    pub fn can_delete(&self) -> bool {
        self.is_owner()
    }
}

// Lookup failures deny access; they are logged and never surfaced.
pub async fn check_access<A>(access_repo: &A, doc_id: Uuid, user_id: Uuid) -> DocumentAccess
where
    A: AccessRepository + ?Sized,
{
    let owned = match access_repo.list_owned_document_ids(user_id).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(error = ?e, %doc_id, %user_id, "owned_documents_lookup_failed");
            return DocumentAccess::denied();
        }
    };
    if owned.contains(&doc_id) {
        return DocumentAccess::owner(user_id);
    }

    let shared = match access_repo.list_shared_grants(user_id).await {
        Ok(grants) => grants,
        Err(e) => {
            tracing::warn!(error = ?e, %doc_id, %user_id, "shared_documents_lookup_failed");
            return DocumentAccess::denied();
        }
    };
    match shared.into_iter().find(|g| g.document_id == doc_id) {
        Some(grant) => DocumentAccess::shared(grant.owner_id, grant.permissions),
        None => DocumentAccess::denied(),
    }
}

pub async fn can_share<A>(access_repo: &A, doc_id: Uuid, user_id: Uuid) -> bool
where
    A: AccessRepository + ?Sized,
{
    check_access(access_repo, doc_id, user_id).await.can_share()
}

pub async fn can_delete<A>(access_repo: &A, doc_id: Uuid, user_id: Uuid) -> bool
where
    A: AccessRepository + ?Sized,
{
    check_access(access_repo, doc_id, user_id).await.can_delete()
}

/// No access at all reads as "not found"; insufficient access as "forbidden".
pub async fn require<A>(
    access_repo: &A,
    doc_id: Uuid,
    user_id: Uuid,
    perm: Permission,
) -> AppResult<DocumentAccess>
where
    A: AccessRepository + ?Sized,
{
    let access = check_access(access_repo, doc_id, user_id).await;
    if !access.has_access {
        return Err(AppError::not_found("document not found"));
    }
    if !access.allows(perm) {
        return Err(AppError::forbidden(format!(
            "missing {} permission",
            perm.as_str()
        )));
    }
    Ok(access)
}

pub async fn require_owner<A>(access_repo: &A, doc_id: Uuid, user_id: Uuid) -> AppResult<()>
where
    A: AccessRepository + ?Sized,
{
    let access = check_access(access_repo, doc_id, user_id).await;
    if !access.has_access {
        return Err(AppError::not_found("document not found"));
    }
    if !access.is_owner() {
        return Err(AppError::forbidden("only the owner can do this"));
    }
    Ok(())
}
