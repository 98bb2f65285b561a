//! Journal use case.

use crate::busy::BusyGuard;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use trinity_core::error::{Result, TrinityError};
use trinity_core::journal::JournalEntry;
use trinity_core::session::Session;
use trinity_core::store::{CollectionSubscription, Direction, DocumentStore, Query, paths};

/// Entries shown, newest first.
pub const JOURNAL_LIMIT: usize = 50;

struct JournalState {
    entries: Vec<JournalEntry>,
    subscription: Option<CollectionSubscription>,
    loading: bool,
}

impl JournalState {
    fn apply_pending(&mut self) -> bool {
        let Some(snapshot) = self
            .subscription
            .as_mut()
            .and_then(|subscription| subscription.try_next())
        else {
            return false;
        };
        self.entries = snapshot
            .iter()
            .filter_map(|doc| match doc.decode::<JournalEntry>() {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(id = %doc.id, error = %err, "Skipping malformed journal entry");
                    None
                }
            })
            .collect();
        self.loading = false;
        true
    }
}

/// Append-only free-text journal of one user.
pub struct Journal {
    session: Session,
    store: Arc<dyn DocumentStore>,
    state: Mutex<JournalState>,
    saving: AtomicBool,
}

impl Journal {
    /// Subscribes to the latest entries.
    pub async fn open(session: Session, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let query = Query::new()
            .order_by("createdAt", Direction::Descending)
            .limit(JOURNAL_LIMIT);
        let subscription = store
            .subscribe_collection(&paths::journal(&session), query)
            .await?;

        let mut state = JournalState {
            entries: Vec::new(),
            subscription: Some(subscription),
            loading: true,
        };
        state.apply_pending();

        Ok(Self {
            session,
            store,
            state: Mutex::new(state),
            saving: AtomicBool::new(false),
        })
    }

    pub async fn refresh(&self) -> bool {
        self.state.lock().await.apply_pending()
    }

    /// Latest observed entries, newest first.
    pub async fn entries(&self) -> Vec<JournalEntry> {
        let mut state = self.state.lock().await;
        state.apply_pending();
        state.entries.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    /// True while an entry is being written.
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Stores `text` exactly as given and returns the new entry's id.
    ///
    /// # Errors
    ///
    /// `Validation` for blank text or while another entry is being saved;
    /// otherwise the store's write error.
    pub async fn add_entry(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(TrinityError::validation("Journal entry must not be empty"));
        }
        let _saving = BusyGuard::try_acquire(&self.saving).ok_or_else(|| {
            TrinityError::validation("A journal entry is already being saved")
        })?;

        let id = self
            .store
            .create(&paths::journal(&self.session), JournalEntry::new_write(text))
            .await?;
        tracing::info!(entry_id = %id, "Journal entry saved");
        Ok(id)
    }

    pub async fn close(&self) {
        if let Some(subscription) = self.state.lock().await.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trinity_infrastructure::InMemoryDocumentStore;

    async fn journal(store: &InMemoryDocumentStore) -> Journal {
        Journal::open(Session::new("u1", "u1@example.com"), Arc::new(store.clone()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_entry_text_round_trips_unchanged() {
        let store = InMemoryDocumentStore::new();
        let journal = journal(&store).await;
        let text = "  Day 1: woke at 5, wrote 500 words.\n";

        let id = journal.add_entry(text).await.unwrap();
        assert!(!id.is_empty());

        let entries = journal.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].text, text);
        assert!(!journal.is_saving());
    }

    #[tokio::test]
    async fn test_blank_entry_is_rejected() {
        let store = InMemoryDocumentStore::new();
        let journal = journal(&store).await;

        for text in ["", "   ", "\n\t"] {
            assert!(journal.add_entry(text).await.unwrap_err().is_validation());
        }
        assert_eq!(store.document_count("users/u1/journal"), 0);
    }

    #[tokio::test]
    async fn test_entries_are_newest_first() {
        let store = InMemoryDocumentStore::new();
        let journal = journal(&store).await;

        let first = journal.add_entry("first").await.unwrap();
        let second = journal.add_entry("second").await.unwrap();

        let ids: Vec<String> = journal.entries().await.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn test_only_latest_entries_are_shown() {
        let store = InMemoryDocumentStore::new();
        let journal = journal(&store).await;

        let mut ids = Vec::new();
        for day in 0..=JOURNAL_LIMIT {
            ids.push(journal.add_entry(&format!("day {day}")).await.unwrap());
        }

        let entries = journal.entries().await;
        assert_eq!(entries.len(), JOURNAL_LIMIT);
        assert_eq!(entries[0].id, ids[JOURNAL_LIMIT]);
        assert!(entries.iter().all(|entry| entry.id != ids[0]));
    }
}
