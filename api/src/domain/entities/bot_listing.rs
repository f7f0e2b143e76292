//! Bot listing domain entity
//!
//! The only record BotHub stores: a Discord and/or WhatsApp bot submitted by a
//! signed-in account and moderated by the owner account.

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotListingId(pub String);

impl From<String> for BotListingId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BotListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Messaging platform a bot runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BotType {
    #[default]
    Discord,
    WhatsApp,
    /// Stored as "Beides", the value the directory has always written
    #[serde(rename = "Beides", alias = "Both")]
    Both,
}

impl BotType {
    pub const ALL: [BotType; 3] = [BotType::Discord, BotType::WhatsApp, BotType::Both];

    /// Value written to the store (and submitted by the form)
    pub fn as_str(&self) -> &'static str {
        match self {
            BotType::Discord => "Discord",
            BotType::WhatsApp => "WhatsApp",
            BotType::Both => "Beides",
        }
    }

    /// Human-readable label for the type selector
    pub fn label(&self) -> &'static str {
        match self {
            BotType::Discord => "Discord",
            BotType::WhatsApp => "WhatsApp",
            BotType::Both => "Discord & WhatsApp",
        }
    }
}

impl std::fmt::Display for BotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Discord" => Ok(BotType::Discord),
            "WhatsApp" => Ok(BotType::WhatsApp),
            "Beides" | "Both" => Ok(BotType::Both),
            _ => Err(format!("Unknown bot type: {}", s)),
        }
    }
}

/// A bot listing as read back from the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotListing {
    pub id: BotListingId,
    pub name: String,
    #[serde(rename = "type")]
    pub bot_type: BotType,
    pub website: String,
    pub discord_link: String,
    pub phone: String,
    pub owner_email: String,
    pub verified: bool,
    pub banned: bool,
    /// Reserved: written empty, never read by any operation
    pub ratings: Vec<serde_json::Value>,
    /// Reserved: written empty, never read by any operation
    pub comments: Vec<serde_json::Value>,
}

impl BotListing {
    /// Public grid visibility depends on the ban flag alone
    pub fn is_public(&self) -> bool {
        !self.banned
    }
}

/// Data needed to submit a new listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBotListing {
    pub name: String,
    pub bot_type: BotType,
    pub website: String,
    pub discord_link: String,
    pub phone: String,
}

/// Outcome of a successful listing mutation
#[derive(Debug, Clone, PartialEq)]
pub enum ListingChange {
    Created(BotListing),
    Verified(BotListingId),
    Banned(BotListingId),
    Removed(BotListingId),
}

impl ListingChange {
    /// Merge this change into a locally cached listing set.
    ///
    /// Returns false when the cached set does not contain the target, in which
    /// case the cache is stale and should be reloaded.
    pub fn apply(&self, listings: &mut Vec<BotListing>) -> bool {
        match self {
            ListingChange::Created(listing) => {
                listings.retain(|l| l.id != listing.id);
                listings.push(listing.clone());
                true
            }
            ListingChange::Verified(id) => match listings.iter_mut().find(|l| &l.id == id) {
                Some(listing) => {
                    listing.verified = true;
                    true
                }
                None => false,
            },
            ListingChange::Banned(id) => match listings.iter_mut().find(|l| &l.id == id) {
                Some(listing) => {
                    listing.banned = true;
                    true
                }
                None => false,
            },
            ListingChange::Removed(id) => {
                let before = listings.len();
                listings.retain(|l| &l.id != id);
                listings.len() != before
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_listing;

    #[test]
    fn bot_type_serializes_both_as_beides() {
        let json = serde_json::to_string(&BotType::Both).unwrap();
        assert_eq!(json, "\"Beides\"");
    }

    #[test]
    fn bot_type_accepts_both_alias() {
        let parsed: BotType = serde_json::from_str("\"Both\"").unwrap();
        assert_eq!(parsed, BotType::Both);
        assert_eq!("Beides".parse::<BotType>().unwrap(), BotType::Both);
        assert!("Telegram".parse::<BotType>().is_err());
    }

    #[test]
    fn banned_listing_is_not_public_even_when_verified() {
        let mut listing = test_listing("HelpBot");
        listing.verified = true;
        listing.banned = true;
        assert!(!listing.is_public());
    }

    #[test]
    fn apply_verified_sets_flag() {
        let listing = test_listing("HelpBot");
        let mut cache = vec![listing.clone()];

        assert!(ListingChange::Verified(listing.id.clone()).apply(&mut cache));
        assert!(cache[0].verified);
        // Idempotent
        assert!(ListingChange::Verified(listing.id).apply(&mut cache));
        assert!(cache[0].verified);
    }

    #[test]
    fn apply_removed_drops_listing() {
        let listing = test_listing("HelpBot");
        let mut cache = vec![listing.clone(), test_listing("Other")];

        assert!(ListingChange::Removed(listing.id.clone()).apply(&mut cache));
        assert_eq!(cache.len(), 1);
        assert!(!ListingChange::Removed(listing.id).apply(&mut cache));
    }

    #[test]
    fn apply_on_unknown_id_reports_stale_cache() {
        let mut cache = vec![test_listing("HelpBot")];
        let unknown = BotListingId("missing".to_string());

        assert!(!ListingChange::Banned(unknown).apply(&mut cache));
        assert!(!cache[0].banned);
    }

    #[test]
    fn apply_created_replaces_duplicate_id() {
        let listing = test_listing("HelpBot");
        let mut cache = vec![listing.clone()];

        assert!(ListingChange::Created(listing).apply(&mut cache));
        assert_eq!(cache.len(), 1);
    }
}
