//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and ports.

pub mod directory_view;
pub mod listing_repository;
pub mod moderation_service;
pub mod session_manager;
pub mod session_registry;

pub use directory_view::{
    AuthMode, BotCard, DirectoryView, FormState, ListingSync, Notice, PageModel, ThemeMode,
    ViewAction,
};
pub use listing_repository::ListingRepository;
pub use moderation_service::{ModerationService, OwnerPolicy};
pub use session_manager::SessionManager;
pub use session_registry::{ClientHandle, SessionId, SessionRegistry};
