//! In-memory port implementations shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::application::ports::access_repository::{AccessRepository, SharedGrant};
use crate::application::ports::credential_store::CredentialStore;
use crate::application::ports::document_repository::DocumentRepository;
use crate::application::ports::drive_client::DriveClient;
use crate::application::ports::oauth_provider::{OAuthError, OAuthProvider};
use crate::application::ports::shares_repository::SharesRepository;
use crate::application::ports::storage_port::StoragePort;
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::domain::documents::document::{Document, NewDocument, Share, SharedDocument};
use crate::domain::documents::permissions::Permission;
use crate::domain::integrations::oauth::{DriveFile, OAuthCredential, TokenGrant};

#[derive(Clone)]
struct ShareRec {
    permissions: Option<Vec<Permission>>,
    created_by: Uuid,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: HashMap<Uuid, UserRow>,
    documents: HashMap<Uuid, Document>,
    shares: HashMap<(Uuid, Uuid), ShareRec>,
}

/// Document store, share store, access lists and users over one shared state.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
    pub fail_lookups: std::sync::atomic::AtomicBool,
}

impl InMemoryBackend {
    pub fn add_user(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().users.insert(
            id,
            UserRow {
                id,
                email: email.to_string(),
                name: email.split('@').next().unwrap_or(email).to_string(),
                password_hash: None,
            },
        );
        id
    }

    pub fn share_count(&self) -> usize {
        self.state.lock().unwrap().shares.len()
    }

    fn lookups_fail(&self) -> bool {
        self.fail_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for InMemoryBackend {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<UserRow>> {
        let mut st = self.state.lock().unwrap();
        if st.users.values().any(|u| u.email == email) {
            return Ok(None);
        }
        let row = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: Some(password_hash.to_string()),
        };
        st.users.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRow>> {
        let st = self.state.lock().unwrap();
        Ok(st.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        Ok(self.state.lock().unwrap().users.get(&id).cloned())
    }
}

#[async_trait]
impl DocumentRepository for InMemoryBackend {
    async fn insert(&self, doc: &NewDocument) -> anyhow::Result<Document> {
        let now = Utc::now();
        let row = Document {
            id: doc.id,
            owner_id: doc.owner_id,
            name: doc.name.clone(),
            content_type: doc.content_type.clone(),
            size: doc.size,
            storage_key: doc.storage_key.clone(),
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .documents
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Document>> {
        Ok(self.state.lock().unwrap().documents.get(&id).cloned())
    }

    async fn list_owned(&self, owner_id: Uuid) -> anyhow::Result<Vec<Document>> {
        let st = self.state.lock().unwrap();
        let mut docs: Vec<Document> = st
            .documents
            .values()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }

    async fn rename(&self, id: Uuid, name: &str) -> anyhow::Result<Option<Document>> {
        let mut st = self.state.lock().unwrap();
        Ok(st.documents.get_mut(&id).map(|d| {
            d.name = name.to_string();
            d.updated_at = Utc::now();
            d.clone()
        }))
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> anyhow::Result<Option<Document>> {
        let mut st = self.state.lock().unwrap();
        match st.documents.get(&id) {
            Some(d) if d.owner_id == owner_id => {}
            _ => return Ok(None),
        }
        st.shares.retain(|(doc_id, _), _| *doc_id != id);
        Ok(st.documents.remove(&id))
    }
}

#[async_trait]
impl SharesRepository for InMemoryBackend {
    async fn upsert_share(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
        grantee_id: Uuid,
        permissions: Option<&[Permission]>,
    ) -> anyhow::Result<Share> {
        let mut st = self.state.lock().unwrap();
        let email = st
            .users
            .get(&grantee_id)
            .map(|u| u.email.clone())
            .ok_or_else(|| anyhow::anyhow!("grantee missing"))?;
        let rec = ShareRec {
            permissions: permissions.map(|p| p.to_vec()),
            created_by: owner_id,
            created_at: Utc::now(),
        };
        st.shares.insert((document_id, grantee_id), rec.clone());
        Ok(Share {
            document_id,
            grantee_id,
            grantee_email: email,
            permissions: rec.permissions,
            created_by: rec.created_by,
            created_at: rec.created_at,
        })
    }

    async fn list_document_shares(&self, document_id: Uuid) -> anyhow::Result<Vec<Share>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .shares
            .iter()
            .filter(|((doc_id, _), _)| *doc_id == document_id)
            .map(|((doc_id, grantee_id), rec)| Share {
                document_id: *doc_id,
                grantee_id: *grantee_id,
                grantee_email: st
                    .users
                    .get(grantee_id)
                    .map(|u| u.email.clone())
                    .unwrap_or_default(),
                permissions: rec.permissions.clone(),
                created_by: rec.created_by,
                created_at: rec.created_at,
            })
            .collect())
    }

    async fn delete_share(&self, document_id: Uuid, grantee_id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.state.lock().unwrap();
        Ok(st.shares.remove(&(document_id, grantee_id)).is_some())
    }

    async fn list_shared_with(&self, grantee_id: Uuid) -> anyhow::Result<Vec<SharedDocument>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .shares
            .iter()
            .filter(|((_, g), _)| *g == grantee_id)
            .filter_map(|((doc_id, _), rec)| {
                st.documents.get(doc_id).map(|d| SharedDocument {
                    document: d.clone(),
                    permissions: rec.permissions.clone(),
                    shared_at: rec.created_at,
                })
            })
            .collect())
    }
}

#[async_trait]
impl AccessRepository for InMemoryBackend {
    async fn list_owned_document_ids(&self, user_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        if self.lookups_fail() {
            anyhow::bail!("document store unavailable");
        }
        let st = self.state.lock().unwrap();
        Ok(st
            .documents
            .values()
            .filter(|d| d.owner_id == user_id)
            .map(|d| d.id)
            .collect())
    }

    async fn list_shared_grants(&self, user_id: Uuid) -> anyhow::Result<Vec<SharedGrant>> {
        if self.lookups_fail() {
            anyhow::bail!("document store unavailable");
        }
        let st = self.state.lock().unwrap();
        Ok(st
            .shares
            .iter()
            .filter(|((_, g), _)| *g == user_id)
            .filter_map(|((doc_id, _), rec)| {
                st.documents.get(doc_id).map(|d| SharedGrant {
                    document_id: d.id,
                    owner_id: d.owner_id,
                    permissions: rec.permissions.clone(),
                })
            })
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl StoragePort for InMemoryStorage {
    async fn put_object(
        &self,
        key: &str,
        bytes: &[u8],
        _content_type: Option<&str>,
    ) -> anyhow::Result<()> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read_object(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("not_found"))
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> anyhow::Result<String> {
        Ok(format!("memory://{}?ttl={}", key, ttl.as_secs()))
    }
}

#[derive(Default)]
pub struct InMemoryCredentials {
    creds: Mutex<HashMap<(Uuid, String), OAuthCredential>>,
}

impl InMemoryCredentials {
    pub fn snapshot(&self, user_id: Uuid, provider: &str) -> Option<OAuthCredential> {
        self.creds
            .lock()
            .unwrap()
            .get(&(user_id, provider.to_string()))
            .cloned()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentials {
    async fn get(&self, user_id: Uuid, provider: &str) -> anyhow::Result<Option<OAuthCredential>> {
        Ok(self.snapshot(user_id, provider))
    }

    async fn save(
        &self,
        user_id: Uuid,
        provider: &str,
        credential: &OAuthCredential,
    ) -> anyhow::Result<()> {
        self.creds
            .lock()
            .unwrap()
            .insert((user_id, provider.to_string()), credential.clone());
        Ok(())
    }

    async fn update_access_token(
        &self,
        user_id: Uuid,
        provider: &str,
        access_token: &str,
        expires_at: Option<chrono::DateTime<Utc>>,
    ) -> anyhow::Result<bool> {
        let mut creds = self.creds.lock().unwrap();
        match creds.get_mut(&(user_id, provider.to_string())) {
            Some(c) => {
                c.access_token = access_token.to_string();
                c.expires_at = expires_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user_id: Uuid, provider: &str) -> anyhow::Result<bool> {
        Ok(self
            .creds
            .lock()
            .unwrap()
            .remove(&(user_id, provider.to_string()))
            .is_some())
    }
}

/// Accepts exactly one refresh token and one authorization code.
pub struct FakeOAuthProvider {
    pub valid_refresh_token: String,
    pub valid_code: String,
    pub transport_down: bool,
    pub rotate_refresh_token: bool,
    pub refresh_calls: AtomicUsize,
    pub revoked: Mutex<Vec<String>>,
}

impl FakeOAuthProvider {
    pub fn new(valid_refresh_token: &str) -> Self {
        Self {
            valid_refresh_token: valid_refresh_token.to_string(),
            valid_code: "good-code".to_string(),
            transport_down: false,
            rotate_refresh_token: false,
            refresh_calls: AtomicUsize::new(0),
            revoked: Mutex::new(Vec::new()),
        }
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthProvider for FakeOAuthProvider {
    fn provider_name(&self) -> &'static str {
        crate::domain::integrations::oauth::GOOGLE_PROVIDER
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("https://auth.example/authorize?state={}", state)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, OAuthError> {
        if self.transport_down {
            return Err(OAuthError::Transport("connection refused".into()));
        }
        if code != self.valid_code {
            return Err(OAuthError::InvalidGrant("invalid_grant".into()));
        }
        Ok(TokenGrant {
            access_token: "exchanged-access".into(),
            refresh_token: Some(self.valid_refresh_token.clone()),
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
        })
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError> {
        let n = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.transport_down {
            return Err(OAuthError::Transport("connection refused".into()));
        }
        if refresh_token != self.valid_refresh_token {
            return Err(OAuthError::InvalidGrant("invalid_grant".into()));
        }
        Ok(TokenGrant {
            access_token: format!("refreshed-access-{}", n),
            refresh_token: self
                .rotate_refresh_token
                .then(|| "rotated-refresh".to_string()),
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
        })
    }

    async fn revoke(&self, token: &str) -> Result<(), OAuthError> {
        self.revoked.lock().unwrap().push(token.to_string());
        Ok(())
    }
}

/// Accepts only tokens listed in `accepted`.
#[derive(Default)]
pub struct FakeDrive {
    pub accepted: Mutex<Vec<String>>,
    pub seen: Mutex<Vec<String>>,
}

impl FakeDrive {
    pub fn accepting(tokens: &[&str]) -> Self {
        Self {
            accepted: Mutex::new(tokens.iter().map(|t| t.to_string()).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DriveClient for FakeDrive {
    async fn list_files(
        &self,
        access_token: &str,
        _folder_id: Option<&str>,
    ) -> Result<Vec<DriveFile>, OAuthError> {
        self.seen.lock().unwrap().push(access_token.to_string());
        if !self
            .accepted
            .lock()
            .unwrap()
            .iter()
            .any(|t| t == access_token)
        {
            return Err(OAuthError::Unauthorized);
        }
        Ok(vec![DriveFile {
            id: "f1".into(),
            name: "report.pdf".into(),
            mime_type: "application/pdf".into(),
            size: Some(42),
            modified_at: None,
        }])
    }
}
