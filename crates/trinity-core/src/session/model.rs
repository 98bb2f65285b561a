//! Session domain model.

use serde::{Deserialize, Serialize};

/// An authenticated identity.
///
/// Exists only while signed in. Every store path is scoped under `uid`, and
/// views receive the session explicitly instead of reading a global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Identity-service user id
    pub uid: String,
    /// Email address used to sign in
    pub email: String,
    /// Profile display name, set at sign-up
    #[serde(default)]
    pub display_name: Option<String>,
    /// Bearer token for the hosted document store, when the backend issues one
    #[serde(default, skip_serializing)]
    pub id_token: Option<String>,
}

impl Session {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            display_name: None,
            id_token: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }

    /// Name shown in greetings: the display name, or the email's local part.
    pub fn greeting_name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_name_falls_back_to_email() {
        let session = Session::new("u1", "nia@example.com");
        assert_eq!(session.greeting_name(), "nia");

        let named = session.with_display_name("Nia");
        assert_eq!(named.greeting_name(), "Nia");
    }

    #[test]
    fn test_id_token_is_not_serialized() {
        let session = Session::new("u1", "a@b.co").with_id_token("secret");
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret"));
    }
}
