//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! The persisted document layout lives with the listing repository.

pub mod account;
pub mod bot_listing;

pub use account::{Account, AuthSession};
pub use bot_listing::{BotListing, BotListingId, BotType, ListingChange, NewBotListing};
