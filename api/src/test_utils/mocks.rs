//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::entities::{Account, AuthSession};
use crate::domain::ports::{DocumentStore, Fields, IdentityProvider, StoredDocument};
use crate::error::{AuthError, StoreError};

// ============================================================================
// In-Memory Document Store
// ============================================================================

/// Document store keeping each collection in insertion order
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Vec<StoredDocument>>>>,
    last_auth_token: Arc<RwLock<Option<String>>>,
    fail: AtomicBool,
    reject_tokens: AtomicBool,
    writes: AtomicUsize,
    fetches: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as if the service were unreachable
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Reject every bearer token, as the real store does once ID tokens expire
    pub fn set_rejecting_tokens(&self, reject: bool) {
        self.reject_tokens.store(reject, Ordering::SeqCst);
    }

    /// Pre-populate a document without counting it as a write
    pub fn seed(&self, collection: &str, id: &str, fields: Fields) {
        self.collections
            .write()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.to_string(),
                fields,
            });
    }

    pub fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        self.collections
            .read()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of insert/update/delete calls that reached the store
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Token passed with the most recent call
    pub fn last_auth_token(&self) -> Option<String> {
        self.last_auth_token.read().unwrap().clone()
    }

    fn begin(&self, auth_token: Option<&str>) -> Result<(), StoreError> {
        *self.last_auth_token.write().unwrap() = auth_token.map(str::to_string);
        if auth_token.is_some() && self.reject_tokens.load(Ordering::SeqCst) {
            return Err(StoreError::Unauthenticated);
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(
        &self,
        collection: &str,
        fields: Fields,
        auth_token: Option<&str>,
    ) -> Result<String, StoreError> {
        self.begin(auth_token)?;
        self.writes.fetch_add(1, Ordering::SeqCst);

        let id = uuid::Uuid::new_v4().simple().to_string();
        self.seed(collection, &id, fields);
        Ok(id)
    }

    async fn fetch_all(
        &self,
        collection: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.begin(auth_token)?;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents(collection))
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        auth_token: Option<&str>,
    ) -> Result<(), StoreError> {
        self.begin(auth_token)?;
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut collections = self.collections.write().unwrap();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection, id)))?;
        doc.fields.extend(fields);
        Ok(())
    }

    async fn delete(
        &self,
        collection: &str,
        id: &str,
        auth_token: Option<&str>,
    ) -> Result<(), StoreError> {
        self.begin(auth_token)?;
        self.writes.fetch_add(1, Ordering::SeqCst);

        if let Some(docs) = self.collections.write().unwrap().get_mut(collection) {
            docs.retain(|d| d.id != id);
        }
        Ok(())
    }
}

// ============================================================================
// Mock Identity Provider
// ============================================================================

/// Identity provider with a fixed password table
#[derive(Default)]
pub struct MockIdentityProvider {
    accounts: Arc<RwLock<HashMap<String, String>>>,
    sign_outs: AtomicUsize,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an account for testing
    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.accounts
            .write()
            .unwrap()
            .insert(email.to_string(), password.to_string());
        self
    }

    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    fn session_for(email: &str) -> AuthSession {
        AuthSession {
            account: Account {
                uid: format!("uid-{}", email),
                email: email.to_string(),
            },
            id_token: format!("token-{}", email),
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let accounts = self.accounts.read().unwrap();
        match accounts.get(email) {
            None => Err(AuthError::UserNotFound),
            Some(stored) if stored != password => Err(AuthError::WrongPassword),
            Some(_) => Ok(Self::session_for(email)),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if password.len() < 6 {
            return Err(AuthError::WeakPassword(
                "Password should be at least 6 characters".to_string(),
            ));
        }

        let mut accounts = self.accounts.write().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::EmailInUse);
        }
        accounts.insert(email.to_string(), password.to_string());
        Ok(Self::session_for(email))
    }

    async fn sign_out(&self, _session: &AuthSession) -> Result<(), AuthError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
