//! Auth gateway trait.

use super::model::Session;
use crate::error::Result;
use crate::store::Subscription;
use async_trait::async_trait;

/// Live view of the signed-in identity.
///
/// The first `next()` yields the current status; later calls yield every
/// sign-in and sign-out.
pub type SessionWatch = Subscription<Option<Session>>;

/// An abstract identity service.
///
/// Failures are returned as `TrinityError::Auth` with a message meant to be
/// shown to the user as-is. Implementations never retry.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Opens a session observer.
    fn observe_session(&self) -> SessionWatch;

    /// Returns the session currently signed in, if any.
    fn current_session(&self) -> Option<Session>;

    /// Creates an account and signs it in.
    ///
    /// # Errors
    ///
    /// Invalid or duplicate email, weak password, or network failure.
    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<Session>;

    /// Signs in an existing account.
    ///
    /// # Errors
    ///
    /// Bad credentials or network failure.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Signs out locally. Observers see `None` afterwards.
    async fn sign_out(&self) -> Result<()>;
}
