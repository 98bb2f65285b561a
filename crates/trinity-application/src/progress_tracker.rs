//! Pillar progress use case.

use std::sync::Arc;
use tokio::sync::Mutex;
use trinity_core::error::{Result, TrinityError};
use trinity_core::pillar::{self, Pillar, PillarCategory};
use trinity_core::progress::UserProgress;
use trinity_core::session::Session;
use trinity_core::store::{Document, DocumentStore, DocumentSubscription, paths};

struct ProgressState {
    progress: UserProgress,
    subscription: Option<DocumentSubscription>,
    loading: bool,
}

impl ProgressState {
    fn apply_pending(&mut self) -> bool {
        let Some(snapshot) = self
            .subscription
            .as_mut()
            .and_then(|subscription| subscription.try_next())
        else {
            return false;
        };
        self.progress = decode_progress(snapshot.as_ref());
        self.loading = false;
        true
    }
}

/// A missing or unreadable document counts as no progress.
fn decode_progress(document: Option<&Document>) -> UserProgress {
    match document.map(Document::decode::<UserProgress>) {
        Some(Ok(progress)) => progress,
        Some(Err(err)) => {
            tracing::warn!(error = %err, "Ignoring malformed progress document");
            UserProgress::default()
        }
        None => UserProgress::default(),
    }
}

/// Tracks which of the 30 pillars a user has completed.
///
/// The projection only changes when the store emits; `toggle` writes and
/// waits for the snapshot instead of mutating local state.
pub struct ProgressTracker {
    session: Session,
    store: Arc<dyn DocumentStore>,
    state: Mutex<ProgressState>,
}

impl ProgressTracker {
    /// Subscribes to the user's progress document.
    pub async fn open(session: Session, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let subscription = store.subscribe_document(&paths::progress(&session)).await?;
        let mut state = ProgressState {
            progress: UserProgress::default(),
            subscription: Some(subscription),
            loading: true,
        };
        state.apply_pending();

        Ok(Self {
            session,
            store,
            state: Mutex::new(state),
        })
    }

    pub async fn refresh(&self) -> bool {
        self.state.lock().await.apply_pending()
    }

    /// Latest observed progress.
    pub async fn progress(&self) -> UserProgress {
        let mut state = self.state.lock().await;
        state.apply_pending();
        state.progress.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    /// Flips completion of one pillar against the last observed snapshot.
    ///
    /// Returns the completed list that was written.
    ///
    /// # Errors
    ///
    /// `Validation` for an unknown pillar id, or the store's write error.
    pub async fn toggle(&self, pillar_id: &str) -> Result<Vec<String>> {
        if pillar::find(pillar_id).is_none() {
            return Err(TrinityError::validation(format!(
                "Unknown pillar: '{pillar_id}'"
            )));
        }

        let completed = {
            let mut state = self.state.lock().await;
            state.apply_pending();
            state.progress.toggled(pillar_id)
        };

        self.store
            .set(
                &paths::progress(&self.session),
                UserProgress::write_for(completed.clone()),
                true,
            )
            .await?;

        tracing::info!(pillar_id, completed = completed.len(), "Progress updated");
        Ok(completed)
    }

    /// Overall completion in percent of all 30 pillars.
    pub async fn percentage(&self) -> f64 {
        self.progress().await.percentage()
    }

    pub async fn category_completed(&self, category: PillarCategory) -> usize {
        self.progress().await.category_completed(category)
    }

    /// The pillars of one category, in catalog order.
    pub fn pillars(&self, category: PillarCategory) -> Vec<&'static Pillar> {
        pillar::by_category(category).collect()
    }

    pub async fn close(&self) {
        if let Some(subscription) = self.state.lock().await.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
