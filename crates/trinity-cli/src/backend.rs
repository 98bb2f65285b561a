//! Backend selection and sign-in.

use crate::{BackendKind, Credentials};
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use trinity_application::{Route, SessionGate};
use trinity_core::config::TrinityConfig;
use trinity_core::session::Session;
use trinity_core::store::DocumentStore;
use trinity_infrastructure::firestore::FirestoreSettings;
use trinity_infrastructure::{
    ConfigService, FirestoreRestStore, IdentityToolkitAuthGateway, InMemoryAuthGateway,
    InMemoryDocumentStore,
};
use trinity_interaction::LanguageModelClient;

const GUEST_EMAIL: &str = "guest@trinity.local";
const GUEST_PASSWORD: &str = "trinity-guest";
const GUEST_NAME: &str = "Guest";

/// Everything a command needs for one signed-in user.
pub struct AppContext {
    pub session: Session,
    pub store: Arc<dyn DocumentStore>,
    pub responder: LanguageModelClient,
    gate: SessionGate,
}

impl AppContext {
    /// Fails unless the signed-in user may open `route`.
    pub async fn require(&self, route: Route) -> Result<()> {
        let resolved = self.gate.resolve(route).await;
        if resolved != route {
            bail!("{route} requires a signed-in account (redirected to {resolved})");
        }
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.gate.sign_out().await?;
        Ok(())
    }
}

pub fn load_config(config_dir: Option<&Path>) -> Result<TrinityConfig> {
    let service = ConfigService::new(config_dir).context("Failed to locate config directory")?;
    service.load().context("Failed to load configuration")
}

/// Signs in on the selected backend and opens its document store.
pub async fn connect(
    kind: BackendKind,
    credentials: &Credentials,
    config: TrinityConfig,
) -> Result<AppContext> {
    let responder = LanguageModelClient::from_config(&config);
    match kind {
        BackendKind::Memory => connect_memory(credentials, responder).await,
        BackendKind::Firebase => connect_firebase(credentials, &config, responder).await,
    }
}

async fn connect_memory(
    credentials: &Credentials,
    responder: LanguageModelClient,
) -> Result<AppContext> {
    let gate = SessionGate::new(Arc::new(InMemoryAuthGateway::new()));
    gate.wait_ready().await;

    let session = gate
        .sign_up(
            credentials.email.as_deref().unwrap_or(GUEST_EMAIL),
            credentials.password.as_deref().unwrap_or(GUEST_PASSWORD),
            credentials.name.as_deref().unwrap_or(GUEST_NAME),
        )
        .await?;
    tracing::info!(uid = %session.uid, "Using in-memory backend; data is discarded on exit");

    Ok(AppContext {
        session,
        store: Arc::new(InMemoryDocumentStore::new()),
        responder,
        gate,
    })
}

async fn connect_firebase(
    credentials: &Credentials,
    config: &TrinityConfig,
    responder: LanguageModelClient,
) -> Result<AppContext> {
    let api_key = config
        .firebase_api_key()
        .context("Firebase API key is not configured (set FIREBASE_API_KEY or secret.json)")?;
    let project_id = config
        .firebase_project_id()
        .context("Firebase project id is not configured (set FIREBASE_PROJECT_ID or config.toml)")?;
    let (Some(email), Some(password)) = (&credentials.email, &credentials.password) else {
        bail!("--email and --password are required with --backend firebase");
    };

    let gate = SessionGate::new(Arc::new(IdentityToolkitAuthGateway::new(api_key)));
    gate.wait_ready().await;
    let session = match &credentials.name {
        Some(name) => gate.sign_up(email, password, name).await?,
        None => gate.sign_in(email, password).await?,
    };

    let mut store = FirestoreRestStore::new(FirestoreSettings {
        project_id: project_id.to_string(),
        poll_interval: Duration::from_millis(config.app.firebase.poll_interval_ms),
    });
    if let Some(token) = &session.id_token {
        store = store.with_id_token(token.clone());
    }

    Ok(AppContext {
        session,
        store: Arc::new(store),
        responder,
        gate,
    })
}
