//! Infrastructure layer for the Trinity client.
//!
//! Concrete identity and document-store backends, configuration loading and
//! logging setup.

pub mod config_service;
pub mod firestore;
pub mod identity_toolkit;
pub mod logging;
pub mod memory_auth;
pub mod memory_store;
pub mod paths;
mod session_state;

pub use crate::config_service::ConfigService;
pub use crate::firestore::FirestoreRestStore;
pub use crate::identity_toolkit::IdentityToolkitAuthGateway;
pub use crate::memory_auth::InMemoryAuthGateway;
pub use crate::memory_store::InMemoryDocumentStore;
pub use crate::paths::TrinityPaths;
