//! Document store port trait
//!
//! A collection-scoped view of the hosted document database. No schema is
//! enforced here; shape validation belongs to the repositories built on top.

use async_trait::async_trait;

use crate::error::StoreError;

/// Field map of a single document
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A document as returned by `fetch_all`
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Fields,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document, returning its store-assigned id
    async fn insert(
        &self,
        collection: &str,
        fields: Fields,
        auth_token: Option<&str>,
    ) -> Result<String, StoreError>;

    /// Fetch every document in a collection
    async fn fetch_all(
        &self,
        collection: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Overwrite the given fields of an existing document, leaving others untouched
    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        auth_token: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Delete a document permanently
    async fn delete(
        &self,
        collection: &str,
        id: &str,
        auth_token: Option<&str>,
    ) -> Result<(), StoreError>;
}
