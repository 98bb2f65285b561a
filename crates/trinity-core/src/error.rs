//! Error types for the Trinity client.

use thiserror::Error;

/// A shared error type for the entire Trinity client.
///
/// Every layer (store, identity, language model, views) reports failures
/// through this enum so callers can branch on the category without string
/// matching.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrinityError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Identity service rejection. Displayed verbatim.
    #[error("{0}")]
    Auth(AuthError),

    /// Missing credential or invalid static selection
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before any remote call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Data access error (document store layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Network or remote API failure
    #[error("Transport error: {message}")]
    Transport {
        status_code: Option<u16>,
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Category of an identity-service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    InvalidEmail,
    EmailAlreadyInUse,
    WeakPassword,
    InvalidCredentials,
    UserNotFound,
    Network,
    Other,
}

/// An identity-service failure with the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub message: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl TrinityError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an Auth error
    pub fn auth(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self::Auth(AuthError::new(kind, message))
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Transport error
    pub fn transport(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status_code,
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the auth failure kind if this is an Auth error.
    pub fn auth_kind(&self) -> Option<AuthErrorKind> {
        match self {
            Self::Auth(err) => Some(err.kind),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<AuthError> for TrinityError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<std::io::Error> for TrinityError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for TrinityError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TrinityError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TrinityError>`.
pub type Result<T> = std::result::Result<T, TrinityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_displays_verbatim() {
        let err = TrinityError::auth(AuthErrorKind::WeakPassword, "Password should be at least 6 characters");
        assert_eq!(err.to_string(), "Password should be at least 6 characters");
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::WeakPassword));
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let err: TrinityError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, TrinityError::Serialization { ref format, .. } if format == "JSON"));
    }
}
