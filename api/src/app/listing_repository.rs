//! Listing repository
//!
//! Wraps the document store for the bots collection: encodes and decodes the
//! persisted layout and validates submissions before anything is written.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::{BotListing, BotListingId, BotType, ListingChange, NewBotListing};
use crate::domain::ports::{DocumentStore, Fields, StoredDocument};
use crate::error::{DomainError, StoreError};

/// Message shown when a submission has no name
pub const EMPTY_NAME_MESSAGE: &str = "Bitte Bot Name eingeben";

/// Persisted layout of a listing document
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingDocument {
    name: String,
    #[serde(rename = "type", default)]
    bot_type: BotType,
    #[serde(default)]
    website: String,
    #[serde(default)]
    discord: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    owner_email: String,
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    banned: bool,
    #[serde(default)]
    ratings: Vec<Value>,
    #[serde(default)]
    comments: Vec<Value>,
}

impl ListingDocument {
    fn into_listing(self, id: BotListingId) -> BotListing {
        BotListing {
            id,
            name: self.name,
            bot_type: self.bot_type,
            website: self.website,
            discord_link: self.discord,
            phone: self.phone,
            owner_email: self.owner_email,
            verified: self.verified,
            banned: self.banned,
            ratings: self.ratings,
            comments: self.comments,
        }
    }
}

/// Repository for bot listings
pub struct ListingRepository<S>
where
    S: DocumentStore + ?Sized,
{
    store: Arc<S>,
    collection: String,
}

impl<S> ListingRepository<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(store: Arc<S>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Fetch every listing, banned ones included.
    ///
    /// Documents that do not decode as listings are skipped.
    pub async fn fetch_all(&self, auth_token: Option<&str>) -> Result<Vec<BotListing>, DomainError> {
        let documents = self.store.fetch_all(&self.collection, auth_token).await?;
        let total = documents.len();

        let listings: Vec<BotListing> = documents
            .into_iter()
            .filter_map(|doc| match decode_listing(doc) {
                Ok(listing) => Some(listing),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed listing document");
                    None
                }
            })
            .collect();

        tracing::debug!(total, decoded = listings.len(), "Fetched listings");
        Ok(listings)
    }

    /// Submit a new listing owned by `owner_email`
    pub async fn create(
        &self,
        input: &NewBotListing,
        owner_email: &str,
        auth_token: Option<&str>,
    ) -> Result<ListingChange, DomainError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation(EMPTY_NAME_MESSAGE.to_string()));
        }

        let document = ListingDocument {
            name: name.to_string(),
            bot_type: input.bot_type,
            website: input.website.trim().to_string(),
            discord: input.discord_link.trim().to_string(),
            phone: input.phone.trim().to_string(),
            owner_email: owner_email.to_string(),
            verified: false,
            banned: false,
            ratings: Vec::new(),
            comments: Vec::new(),
        };
        let fields = encode_document(&document)?;

        let id = self
            .store
            .insert(&self.collection, fields, auth_token)
            .await?;
        tracing::info!(listing_id = %id, name = %document.name, owner = %owner_email, "Listing created");

        Ok(ListingChange::Created(
            document.into_listing(BotListingId(id)),
        ))
    }

    /// Mark a listing verified
    pub async fn set_verified(
        &self,
        id: &BotListingId,
        auth_token: Option<&str>,
    ) -> Result<ListingChange, DomainError> {
        self.set_flag(id, "verified", auth_token).await?;
        Ok(ListingChange::Verified(id.clone()))
    }

    /// Mark a listing banned
    pub async fn set_banned(
        &self,
        id: &BotListingId,
        auth_token: Option<&str>,
    ) -> Result<ListingChange, DomainError> {
        self.set_flag(id, "banned", auth_token).await?;
        Ok(ListingChange::Banned(id.clone()))
    }

    /// Delete a listing permanently
    pub async fn remove(
        &self,
        id: &BotListingId,
        auth_token: Option<&str>,
    ) -> Result<ListingChange, DomainError> {
        self.store
            .delete(&self.collection, &id.0, auth_token)
            .await
            .map_err(|e| not_found_as_domain(e, id))?;
        tracing::info!(listing_id = %id, "Listing removed");
        Ok(ListingChange::Removed(id.clone()))
    }

    async fn set_flag(
        &self,
        id: &BotListingId,
        field: &str,
        auth_token: Option<&str>,
    ) -> Result<(), DomainError> {
        let mut fields = Fields::new();
        fields.insert(field.to_string(), Value::Bool(true));

        self.store
            .update_fields(&self.collection, &id.0, fields, auth_token)
            .await
            .map_err(|e| not_found_as_domain(e, id))?;
        tracing::info!(listing_id = %id, field, "Listing flag set");
        Ok(())
    }
}

fn encode_document(document: &ListingDocument) -> Result<Fields, StoreError> {
    match serde_json::to_value(document) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(StoreError::Decode(format!(
            "listing encoded as non-object: {}",
            other
        ))),
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}

fn decode_listing(doc: StoredDocument) -> Result<BotListing, StoreError> {
    let StoredDocument { id, fields } = doc;
    let document: ListingDocument = serde_json::from_value(Value::Object(fields))
        .map_err(|e| StoreError::Decode(format!("{}: {}", id, e)))?;
    Ok(document.into_listing(BotListingId(id)))
}

fn not_found_as_domain(e: StoreError, id: &BotListingId) -> DomainError {
    match e {
        StoreError::NotFound(_) => DomainError::NotFound(id.to_string()),
        e => DomainError::Store(e),
    }
}
