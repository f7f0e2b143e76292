//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod document_store;
pub mod identity;

pub use document_store::{DocumentStore, Fields, StoredDocument};
pub use identity::IdentityProvider;
