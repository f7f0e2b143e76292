//! Moderation service
//!
//! Owner-only verify/ban/delete on top of the listing repository.
//!
//! The owner check here only decides what this server offers. The actor's ID
//! token is forwarded with every write, so the document store's access rules
//! remain the enforcement point.

use std::sync::Arc;

use crate::app::ListingRepository;
use crate::domain::entities::{Account, AuthSession, BotListing, BotListingId, ListingChange};
use crate::domain::ports::DocumentStore;
use crate::error::DomainError;

/// Decides which account is the directory owner
#[derive(Debug, Clone)]
pub struct OwnerPolicy {
    owner_email: String,
}

impl OwnerPolicy {
    pub fn new(owner_email: impl Into<String>) -> Self {
        Self {
            owner_email: owner_email.into().trim().to_string(),
        }
    }

    pub fn owner_email(&self) -> &str {
        &self.owner_email
    }

    pub fn is_owner(&self, account: &Account) -> bool {
        self.is_owner_email(&account.email)
    }

    /// Listings submitted by the owner account are highlighted in the grid
    pub fn is_owner_listing(&self, listing: &BotListing) -> bool {
        self.is_owner_email(&listing.owner_email)
    }

    fn is_owner_email(&self, email: &str) -> bool {
        !self.owner_email.is_empty() && email.trim().eq_ignore_ascii_case(&self.owner_email)
    }
}

/// Service for owner moderation actions
pub struct ModerationService<S>
where
    S: DocumentStore + ?Sized,
{
    listings: Arc<ListingRepository<S>>,
    policy: OwnerPolicy,
}

impl<S> ModerationService<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(listings: Arc<ListingRepository<S>>, policy: OwnerPolicy) -> Self {
        Self { listings, policy }
    }

    pub fn policy(&self) -> &OwnerPolicy {
        &self.policy
    }

    /// Grant the verified flag
    pub async fn verify(
        &self,
        actor: &AuthSession,
        id: &BotListingId,
    ) -> Result<ListingChange, DomainError> {
        self.authorize(actor, "verify")?;
        self.listings.set_verified(id, Some(&actor.id_token)).await
    }

    /// Hide a listing from the public grid
    pub async fn ban(
        &self,
        actor: &AuthSession,
        id: &BotListingId,
    ) -> Result<ListingChange, DomainError> {
        self.authorize(actor, "ban")?;
        self.listings.set_banned(id, Some(&actor.id_token)).await
    }

    /// Delete a listing permanently
    pub async fn delete(
        &self,
        actor: &AuthSession,
        id: &BotListingId,
    ) -> Result<ListingChange, DomainError> {
        self.authorize(actor, "delete")?;
        self.listings.remove(id, Some(&actor.id_token)).await
    }

    fn authorize(&self, actor: &AuthSession, action: &str) -> Result<(), DomainError> {
        if self.policy.is_owner(&actor.account) {
            return Ok(());
        }

        tracing::warn!(email = %actor.account.email, action, "Moderation refused for non-owner");
        Err(DomainError::Forbidden(format!(
            "Only the owner account may {} listings",
            action
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        test_listing, test_member_session, test_new_listing, test_owner_session,
        InMemoryDocumentStore, OWNER_EMAIL,
    };

    async fn setup() -> (
        Arc<InMemoryDocumentStore>,
        ModerationService<InMemoryDocumentStore>,
        BotListingId,
    ) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let repo = Arc::new(ListingRepository::new(store.clone(), "bots"));
        let ListingChange::Created(listing) = repo
            .create(&test_new_listing("HelpBot"), "a@x.com", None)
            .await
            .unwrap()
        else {
            panic!("expected Created");
        };
        let service = ModerationService::new(repo, OwnerPolicy::new(OWNER_EMAIL));
        (store, service, listing.id)
    }

    #[test]
    fn owner_policy_matches_case_insensitively() {
        let policy = OwnerPolicy::new(" Owner@Example.com ");
        assert!(policy.is_owner(&test_owner_session().account));
        assert!(!policy.is_owner(&test_member_session("user@x.com").account));
    }

    #[test]
    fn empty_owner_policy_matches_nobody() {
        let policy = OwnerPolicy::new("");
        assert!(!policy.is_owner(&test_member_session("").account));
    }

    #[test]
    fn owner_listing_detection() {
        let policy = OwnerPolicy::new(OWNER_EMAIL);
        let mut listing = test_listing("OwnerBot");
        listing.owner_email = OWNER_EMAIL.to_string();
        assert!(policy.is_owner_listing(&listing));
        assert!(!policy.is_owner_listing(&test_listing("Other")));
    }

    #[tokio::test]
    async fn owner_can_verify() {
        let (store, service, id) = setup().await;

        let change = service.verify(&test_owner_session(), &id).await.unwrap();

        assert_eq!(change, ListingChange::Verified(id));
        assert_eq!(store.documents("bots")[0].fields["verified"], true);
        assert_eq!(store.last_auth_token(), Some("owner-token".to_string()));
    }

    #[tokio::test]
    async fn non_owner_cannot_moderate() {
        let (store, service, id) = setup().await;
        let member = test_member_session("user@x.com");
        let writes_before = store.write_count();

        assert!(matches!(
            service.verify(&member, &id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            service.ban(&member, &id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            service.delete(&member, &id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(store.write_count(), writes_before);
    }

    #[tokio::test]
    async fn owner_can_ban_and_delete() {
        let (store, service, id) = setup().await;
        let owner = test_owner_session();

        service.ban(&owner, &id).await.unwrap();
        assert_eq!(store.documents("bots")[0].fields["banned"], true);

        service.delete(&owner, &id).await.unwrap();
        assert!(store.documents("bots").is_empty());
    }
}
