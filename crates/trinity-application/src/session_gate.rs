//! Route guard driven by the identity session.

use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use trinity_core::error::Result;
use trinity_core::session::{AuthGateway, Session, SessionWatch};

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Dashboard,
    AgentChat,
    Journal,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Home,
        Route::Login,
        Route::Dashboard,
        Route::AgentChat,
        Route::Journal,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::AgentChat => "/agent-chat",
            Route::Journal => "/journal",
        }
    }

    /// Whether the route needs a signed-in session.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::AgentChat | Route::Journal)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

struct GateState {
    watch: SessionWatch,
    session: Option<Session>,
    loading: bool,
}

impl GateState {
    fn apply(&mut self, session: Option<Session>) {
        if self.loading {
            tracing::debug!(signed_in = session.is_some(), "Session status resolved");
        }
        self.session = session;
        self.loading = false;
    }
}

/// Decides which screens are reachable for the current session.
///
/// `loading` stays true until the gateway reports the initial session
/// status and never becomes true again.
pub struct SessionGate {
    auth: Arc<dyn AuthGateway>,
    state: Mutex<GateState>,
}

impl SessionGate {
    pub fn new(auth: Arc<dyn AuthGateway>) -> Self {
        let watch = auth.observe_session();
        Self {
            auth,
            state: Mutex::new(GateState {
                watch,
                session: None,
                loading: true,
            }),
        }
    }

    /// Applies a pending session change, if any.
    pub async fn refresh(&self) -> bool {
        let mut state = self.state.lock().await;
        match state.watch.try_next() {
            Some(session) => {
                state.apply(session);
                true
            }
            None => false,
        }
    }

    /// Waits for the initial session status.
    pub async fn wait_ready(&self) -> Option<Session> {
        let mut state = self.state.lock().await;
        if state.loading {
            let session = state.watch.next().await.flatten();
            state.apply(session);
        }
        state.session.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    pub async fn session(&self) -> Option<Session> {
        self.refresh().await;
        self.state.lock().await.session.clone()
    }

    /// Routes offered in navigation. Empty while loading.
    pub async fn visible_routes(&self) -> Vec<Route> {
        self.refresh().await;
        let state = self.state.lock().await;
        if state.loading {
            return Vec::new();
        }
        let signed_in = state.session.is_some();
        Route::ALL
            .into_iter()
            .filter(|route| match route {
                Route::Home => true,
                Route::Login => !signed_in,
                _ => signed_in,
            })
            .collect()
    }

    /// The route actually shown for a requested one.
    pub async fn resolve(&self, requested: Route) -> Route {
        self.refresh().await;
        let state = self.state.lock().await;
        if requested.is_protected() && state.session.is_none() {
            Route::Login
        } else {
            requested
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.auth.sign_in(email, password).await?;
        self.refresh().await;
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<Session> {
        let session = self.auth.sign_up(email, password, display_name).await?;
        self.refresh().await;
        Ok(session)
    }

    /// Signs out and returns the route to show next.
    pub async fn sign_out(&self) -> Result<Route> {
        self.auth.sign_out().await?;
        self.refresh().await;
        Ok(Route::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trinity_infrastructure::InMemoryAuthGateway;

    #[tokio::test]
    async fn test_loading_flips_once() {
        let gate = SessionGate::new(Arc::new(InMemoryAuthGateway::new()));
        assert!(gate.is_loading().await);

        assert_eq!(gate.wait_ready().await, None);
        assert!(!gate.is_loading().await);

        gate.sign_up("a@b.co", "secret1", "Ada").await.unwrap();
        gate.sign_out().await.unwrap();
        assert!(!gate.is_loading().await);
    }

    #[tokio::test]
    async fn test_protected_routes_redirect_when_signed_out() {
        let gate = SessionGate::new(Arc::new(InMemoryAuthGateway::new()));
        gate.wait_ready().await;

        assert_eq!(gate.resolve(Route::Journal).await, Route::Login);
        assert_eq!(gate.resolve(Route::Home).await, Route::Home);
        assert_eq!(gate.visible_routes().await, vec![Route::Home, Route::Login]);
    }

    #[tokio::test]
    async fn test_signed_in_user_sees_protected_routes() {
        let gate = SessionGate::new(Arc::new(InMemoryAuthGateway::new()));
        gate.wait_ready().await;
        gate.sign_up("a@b.co", "secret1", "Ada").await.unwrap();

        assert_eq!(gate.resolve(Route::AgentChat).await, Route::AgentChat);
        assert_eq!(
            gate.visible_routes().await,
            vec![Route::Home, Route::Dashboard, Route::AgentChat, Route::Journal]
        );
        assert_eq!(gate.sign_out().await.unwrap(), Route::Login);
        assert_eq!(gate.resolve(Route::Dashboard).await, Route::Login);
    }
}
