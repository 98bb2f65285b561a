//! Process-local identity service.
//!
//! Mirrors the validation rules of the hosted identity service so flows can
//! be exercised offline and in tests.

use crate::session_state::SessionBroadcaster;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use trinity_core::error::{AuthErrorKind, Result, TrinityError};
use trinity_core::session::{AuthGateway, Session, SessionWatch};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    password: String,
    display_name: Option<String>,
}

/// In-memory [`AuthGateway`].
#[derive(Debug)]
pub struct InMemoryAuthGateway {
    accounts: Mutex<HashMap<String, Account>>,
    sessions: SessionBroadcaster,
    offline: AtomicBool,
}

impl Default for InMemoryAuthGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthGateway {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            sessions: SessionBroadcaster::new(),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulates loss of connectivity; sign-up and sign-in then fail with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(TrinityError::auth(
                AuthErrorKind::Network,
                "A network error has occurred. Check your connection and try again.",
            ));
        }
        Ok(())
    }

    fn accounts(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Account>>> {
        self.accounts
            .lock()
            .map_err(|_| TrinityError::internal("account table lock poisoned"))
    }

    fn session_for(account: &Account) -> Session {
        Session {
            uid: account.uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            id_token: None,
        }
    }
}

/// Loose shape check: one `@`, a non-empty local part and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

#[async_trait]
impl AuthGateway for InMemoryAuthGateway {
    fn observe_session(&self) -> SessionWatch {
        self.sessions.subscribe()
    }

    fn current_session(&self) -> Option<Session> {
        self.sessions.current()
    }

    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<Session> {
        self.ensure_online()?;
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(TrinityError::auth(
                AuthErrorKind::InvalidEmail,
                "The email address is badly formatted.",
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(TrinityError::auth(
                AuthErrorKind::WeakPassword,
                "Password should be at least 6 characters.",
            ));
        }

        let key = email.to_lowercase();
        let account = {
            let mut accounts = self.accounts()?;
            if accounts.contains_key(&key) {
                return Err(TrinityError::auth(
                    AuthErrorKind::EmailAlreadyInUse,
                    "The email address is already in use by another account.",
                ));
            }
            let account = Account {
                uid: Uuid::new_v4().simple().to_string(),
                email: email.to_string(),
                password: password.to_string(),
                display_name: Some(display_name.to_string()),
            };
            accounts.insert(key, account.clone());
            account
        };

        let session = Self::session_for(&account);
        tracing::info!(uid = %session.uid, "Account created");
        self.sessions.publish(Some(session.clone()));
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.ensure_online()?;
        let key = email.trim().to_lowercase();
        let account = self
            .accounts()?
            .get(&key)
            .filter(|account| account.password == password)
            .cloned()
            .ok_or_else(|| {
                TrinityError::auth(
                    AuthErrorKind::InvalidCredentials,
                    "The email or password you entered is incorrect.",
                )
            })?;

        let session = Self::session_for(&account);
        tracing::info!(uid = %session.uid, "Signed in");
        self.sessions.publish(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        self.sessions.publish(None);
        Ok(())
    }
}
