//! Firebase adapters
//!
//! REST clients for Firebase Authentication and Cloud Firestore.

pub mod auth_client;
pub mod firestore;
pub mod value;

pub use auth_client::FirebaseAuthClient;
pub use firestore::FirestoreDocumentStore;
