//! Domain layer for the Trinity client.
//!
//! Entities, static catalogs (agents and pillars) and the contracts that
//! backends implement: [`store::DocumentStore`] and
//! [`session::AuthGateway`].

pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod journal;
pub mod pillar;
pub mod progress;
pub mod session;
pub mod store;

pub use error::{AuthError, AuthErrorKind, Result, TrinityError};
