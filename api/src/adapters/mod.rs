//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod firebase;

pub use firebase::{FirebaseAuthClient, FirestoreDocumentStore};
