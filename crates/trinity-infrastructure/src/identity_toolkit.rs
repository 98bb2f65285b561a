//! Hosted identity service over REST.
//!
//! Email/password accounts via `accounts:signUp`,
//! `accounts:signInWithPassword` and `accounts:update`.

use crate::session_state::SessionBroadcaster;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use trinity_core::error::{AuthErrorKind, Result, TrinityError};
use trinity_core::session::{AuthGateway, Session, SessionWatch};

const BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// [`AuthGateway`] talking to the hosted identity service.
pub struct IdentityToolkitAuthGateway {
    client: Client,
    api_key: String,
    base_url: String,
    sessions: SessionBroadcaster,
}

impl IdentityToolkitAuthGateway {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            sessions: SessionBroadcaster::new(),
        }
    }

    /// Points the client at another endpoint, e.g. a local emulator.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let url = format!("{}/accounts:{method}?key={}", self.base_url, self.api_key);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(method, error = %err, "Identity request failed");
                TrinityError::auth(
                    AuthErrorKind::Network,
                    "A network error has occurred. Check your connection and try again.",
                )
            })?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            let code = serde_json::from_str::<ErrorWrapper>(&body)
                .map(|wrapper| wrapper.error.message)
                .unwrap_or(body);
            return Err(map_auth_error(&code));
        }

        response.json().await.map_err(|err| {
            TrinityError::auth(
                AuthErrorKind::Other,
                format!("Unexpected identity service response: {err}"),
            )
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUpdateRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    id_token: String,
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUpdateResponse {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps a provider error code (e.g. `WEAK_PASSWORD : Password should be...`)
/// to a user-facing auth error.
pub fn map_auth_error(code: &str) -> TrinityError {
    let (head, detail) = match code.split_once(" : ") {
        Some((head, detail)) => (head.trim(), Some(detail.trim())),
        None => (code.trim(), None),
    };

    let (kind, message) = match head {
        "EMAIL_EXISTS" => (
            AuthErrorKind::EmailAlreadyInUse,
            "The email address is already in use by another account.",
        ),
        "INVALID_EMAIL" | "MISSING_EMAIL" => {
            (AuthErrorKind::InvalidEmail, "The email address is badly formatted.")
        }
        "WEAK_PASSWORD" | "MISSING_PASSWORD" => (
            AuthErrorKind::WeakPassword,
            detail.unwrap_or("Password should be at least 6 characters."),
        ),
        "EMAIL_NOT_FOUND" => (
            AuthErrorKind::UserNotFound,
            "There is no account for this email address.",
        ),
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => (
            AuthErrorKind::InvalidCredentials,
            "The email or password you entered is incorrect.",
        ),
        _ => (AuthErrorKind::Other, code),
    };
    TrinityError::auth(kind, message)
}

#[async_trait]
impl AuthGateway for IdentityToolkitAuthGateway {
    fn observe_session(&self) -> SessionWatch {
        self.sessions.subscribe()
    }

    fn current_session(&self) -> Option<Session> {
        self.sessions.current()
    }

    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<Session> {
        let account: AccountResponse = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        // The account exists and is signed in from here on.
        let id_token = account.id_token;
        let mut session = Session {
            uid: account.local_id,
            email: account.email,
            display_name: Some(display_name.to_string()),
            id_token: Some(id_token.clone()),
        };
        tracing::info!(uid = %session.uid, "Account created");
        self.sessions.publish(Some(session.clone()));

        let profile: ProfileUpdateResponse = self
            .call(
                "update",
                &ProfileUpdateRequest {
                    id_token: &id_token,
                    display_name,
                    return_secure_token: false,
                },
            )
            .await
            .inspect_err(|err| {
                tracing::warn!(uid = %session.uid, error = %err, "Display name update failed");
            })?;

        if let Some(name) = profile.display_name.filter(|name| !name.is_empty()) {
            if session.display_name.as_deref() != Some(name.as_str()) {
                session.display_name = Some(name);
                self.sessions.publish(Some(session.clone()));
            }
        }
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let account: AccountResponse = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        let session = Session {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name.filter(|name| !name.is_empty()),
            id_token: Some(account.id_token),
        };
        tracing::info!(uid = %session.uid, "Signed in");
        self.sessions.publish(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        self.sessions.publish(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_codes_map_to_kinds() {
        assert_eq!(
            map_auth_error("EMAIL_EXISTS").auth_kind(),
            Some(AuthErrorKind::EmailAlreadyInUse)
        );
        assert_eq!(
            map_auth_error("INVALID_LOGIN_CREDENTIALS").auth_kind(),
            Some(AuthErrorKind::InvalidCredentials)
        );
        assert_eq!(
            map_auth_error("TOO_MANY_ATTEMPTS_TRY_LATER").auth_kind(),
            Some(AuthErrorKind::Other)
        );
    }

    #[test]
    fn test_weak_password_keeps_provider_detail() {
        let err = map_auth_error("WEAK_PASSWORD : Password should be at least 6 characters");
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::WeakPassword));
        assert_eq!(err.to_string(), "Password should be at least 6 characters");
    }

    /// Serves one canned response per request, chosen by the `accounts:` method.
    async fn stub_identity_service(routes: Vec<(&'static str, u16, &'static str)>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 4096];
                    loop {
                        let n = socket.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            return;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                        let text = String::from_utf8_lossy(&buf);
                        let Some(head_end) = text.find("\r\n\r\n") else {
                            continue;
                        };
                        let length = text[..head_end]
                            .lines()
                            .find_map(|line| {
                                let (name, value) = line.split_once(':')?;
                                name.eq_ignore_ascii_case("content-length")
                                    .then(|| value.trim().parse::<usize>().ok())
                                    .flatten()
                            })
                            .unwrap_or(0);
                        if buf.len() >= head_end + 4 + length {
                            break;
                        }
                    }

                    let request_line = String::from_utf8_lossy(&buf)
                        .lines()
                        .next()
                        .unwrap_or_default()
                        .to_string();
                    let (status, body) = routes
                        .iter()
                        .find(|(method, _, _)| {
                            request_line.contains(&format!("/accounts:{method}?"))
                        })
                        .map(|(_, status, body)| (*status, *body))
                        .unwrap_or((404, r#"{"error":{"message":"NOT_FOUND"}}"#));
                    let response = format!(
                        "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    const SIGN_UP_OK: &str =
        r#"{"idToken":"token-1","localId":"uid-1","email":"a@b.co","refreshToken":"r"}"#;

    #[tokio::test]
    async fn test_sign_up_publishes_session_with_display_name() {
        let base_url = stub_identity_service(vec![
            ("signUp", 200, SIGN_UP_OK),
            ("update", 200, r#"{"localId":"uid-1","displayName":"Ada"}"#),
        ])
        .await;
        let gateway = IdentityToolkitAuthGateway::new("key").with_base_url(base_url);

        let session = gateway.sign_up("a@b.co", "secret1", "Ada").await.unwrap();
        assert_eq!(session.uid, "uid-1");
        assert_eq!(session.display_name.as_deref(), Some("Ada"));
        assert_eq!(session.id_token.as_deref(), Some("token-1"));
        assert_eq!(gateway.current_session(), Some(session));
    }

    #[tokio::test]
    async fn test_failed_profile_update_keeps_new_account_signed_in() {
        let base_url = stub_identity_service(vec![
            ("signUp", 200, SIGN_UP_OK),
            ("update", 500, r#"{"error":{"message":"INTERNAL"}}"#),
        ])
        .await;
        let gateway = IdentityToolkitAuthGateway::new("key").with_base_url(base_url);
        let mut watch = gateway.observe_session();
        assert_eq!(watch.next().await, Some(None));

        let err = gateway.sign_up("a@b.co", "secret1", "Ada").await.unwrap_err();
        assert_eq!(err.auth_kind(), Some(AuthErrorKind::Other));

        let session = gateway.current_session().expect("account stays signed in");
        assert_eq!(session.uid, "uid-1");
        assert_eq!(session.display_name.as_deref(), Some("Ada"));
        assert_eq!(watch.try_next(), Some(Some(session)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_network_error() {
        let gateway = IdentityToolkitAuthGateway::new("key").with_base_url("http://127.0.0.1:9");
        let err = gateway.sign_in("a@b.co", "secret1").await.unwrap_err();

        assert_eq!(err.auth_kind(), Some(AuthErrorKind::Network));
        assert!(gateway.current_session().is_none());
    }
}
