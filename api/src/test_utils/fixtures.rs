//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use uuid::Uuid;

use crate::domain::entities::{
    Account, AuthSession, BotListing, BotListingId, BotType, NewBotListing,
};

/// Owner account used by moderation tests
pub const OWNER_EMAIL: &str = "owner@example.com";

/// Create a stored listing with a fresh id, unverified and not banned
pub fn test_listing(name: &str) -> BotListing {
    BotListing {
        id: BotListingId(Uuid::new_v4().simple().to_string()),
        name: name.to_string(),
        bot_type: BotType::Discord,
        website: format!("https://{}.example", name.to_lowercase()),
        discord_link: String::new(),
        phone: String::new(),
        owner_email: "member@example.com".to_string(),
        verified: false,
        banned: false,
        ratings: Vec::new(),
        comments: Vec::new(),
    }
}

/// Create submission input with only a name
pub fn test_new_listing(name: &str) -> NewBotListing {
    NewBotListing {
        name: name.to_string(),
        ..NewBotListing::default()
    }
}

pub fn test_owner_session() -> AuthSession {
    AuthSession {
        account: Account {
            uid: "owner-uid".to_string(),
            email: OWNER_EMAIL.to_string(),
        },
        id_token: "owner-token".to_string(),
    }
}

/// Create a session for a regular member
pub fn test_member_session(email: &str) -> AuthSession {
    AuthSession {
        account: Account {
            uid: format!("uid-{}", email),
            email: email.to_string(),
        },
        id_token: format!("token-{}", email),
    }
}
