//! Process-local document store with live subscriptions.
//!
//! Documents are kept per collection path. Every write re-evaluates the
//! listeners attached to the touched collection or document and pushes a
//! fresh full snapshot when the result changed.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use trinity_core::error::{Result, TrinityError};
use trinity_core::store::paths::{check_collection_path, split_document_path};
use trinity_core::store::{
    CollectionSubscription, Document, DocumentStore, DocumentSubscription, Query, Subscription,
    Write,
};
use uuid::Uuid;

type Fields = Map<String, Value>;

enum Listener {
    Collection {
        path: String,
        query: Query,
        sender: watch::Sender<Vec<Document>>,
    },
    Document {
        collection: String,
        id: String,
        sender: watch::Sender<Option<Document>>,
    },
}

#[derive(Default)]
struct StoreState {
    collections: HashMap<String, BTreeMap<String, Fields>>,
    listeners: HashMap<u64, Listener>,
    next_listener_id: u64,
    last_timestamp: i64,
}

impl StoreState {
    /// Store clock in epoch milliseconds, strictly increasing across calls.
    fn next_timestamp(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_timestamp = now.max(self.last_timestamp + 1);
        self.last_timestamp
    }

    fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn document(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone()))
    }

    fn register(&mut self, listener: Listener) -> u64 {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    /// Pushes fresh snapshots to listeners affected by a write to `collection/id`.
    fn notify(&self, collection: &str, id: &str) {
        for listener in self.listeners.values() {
            match listener {
                Listener::Collection {
                    path,
                    query,
                    sender,
                } if path == collection => {
                    let snapshot = query.apply(&self.documents(collection));
                    sender.send_if_modified(|current| replace_if_changed(current, snapshot));
                }
                Listener::Document {
                    collection: listened,
                    id: listened_id,
                    sender,
                } if listened == collection && listened_id == id => {
                    let snapshot = self.document(collection, id);
                    sender.send_if_modified(|current| replace_if_changed(current, snapshot));
                }
                _ => {}
            }
        }
    }
}

fn replace_if_changed<T: PartialEq>(current: &mut T, next: T) -> bool {
    if *current == next {
        false
    } else {
        *current = next;
        true
    }
}

/// In-memory [`DocumentStore`].
///
/// Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscriptions that have not been cancelled yet.
    pub fn active_listener_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.listeners.len())
            .unwrap_or_default()
    }

    /// Number of documents directly inside a collection.
    pub fn document_count(&self, collection_path: &str) -> usize {
        self.state
            .lock()
            .map(|state| {
                state
                    .collections
                    .get(collection_path)
                    .map(BTreeMap::len)
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| TrinityError::internal("document store lock poisoned"))
    }

    fn cancel_handle(&self, listener_id: u64) -> impl FnOnce() + Send + Sync + 'static {
        let state = Arc::clone(&self.state);
        move || {
            if let Ok(mut state) = state.lock() {
                state.listeners.remove(&listener_id);
            }
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn subscribe_collection(&self, path: &str, query: Query) -> Result<CollectionSubscription> {
        check_collection_path(path)?;
        let mut state = self.lock()?;
        let (sender, receiver) = watch::channel(query.apply(&state.documents(path)));
        let listener_id = state.register(Listener::Collection {
            path: path.to_string(),
            query,
            sender,
        });
        drop(state);

        tracing::debug!(path, listener_id, "Collection subscription opened");
        Ok(Subscription::new(receiver).with_cancel(self.cancel_handle(listener_id)))
    }

    async fn subscribe_document(&self, path: &str) -> Result<DocumentSubscription> {
        let (collection, id) = split_document_path(path)?;
        let mut state = self.lock()?;
        let (sender, receiver) = watch::channel(state.document(collection, id));
        let listener_id = state.register(Listener::Document {
            collection: collection.to_string(),
            id: id.to_string(),
            sender,
        });
        drop(state);

        tracing::debug!(path, listener_id, "Document subscription opened");
        Ok(Subscription::new(receiver).with_cancel(self.cancel_handle(listener_id)))
    }

    async fn list(&self, path: &str, query: Query) -> Result<Vec<Document>> {
        check_collection_path(path)?;
        let state = self.lock()?;
        Ok(query.apply(&state.documents(path)))
    }

    async fn get_document(&self, path: &str) -> Result<Option<Document>> {
        let (collection, id) = split_document_path(path)?;
        Ok(self.lock()?.document(collection, id))
    }

    async fn create(&self, collection_path: &str, write: Write) -> Result<String> {
        check_collection_path(collection_path)?;
        let id = Uuid::new_v4().simple().to_string();
        let mut state = self.lock()?;
        let now = state.next_timestamp();
        state
            .collections
            .entry(collection_path.to_string())
            .or_default()
            .insert(id.clone(), write.resolve(now));
        state.notify(collection_path, &id);
        Ok(id)
    }

    async fn set(&self, document_path: &str, write: Write, merge: bool) -> Result<()> {
        let (collection, id) = split_document_path(document_path)?;
        let mut state = self.lock()?;
        let now = state.next_timestamp();
        let docs = state.collections.entry(collection.to_string()).or_default();
        let fields = write.resolve(now);
        match docs.get_mut(id) {
            Some(existing) if merge => existing.extend(fields),
            _ => {
                docs.insert(id.to_string(), fields);
            }
        }
        state.notify(collection, id);
        Ok(())
    }

    async fn update(&self, document_path: &str, write: Write) -> Result<()> {
        let (collection, id) = split_document_path(document_path)?;
        let mut state = self.lock()?;
        let now = state.next_timestamp();
        let existing = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| TrinityError::not_found("document", document_path))?;
        existing.extend(write.resolve(now));
        state.notify(collection, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trinity_core::store::Direction;

    #[tokio::test]
    async fn test_collection_subscription_sees_writes() {
        let store = InMemoryDocumentStore::new();
        let mut subscription = store
            .subscribe_collection(
                "users/u/journal",
                Query::new().order_by("createdAt", Direction::Descending),
            )
            .await
            .unwrap();
        assert_eq!(subscription.next().await, Some(vec![]));

        let first = store
            .create("users/u/journal", Write::new().set("text", "one").server_timestamp("createdAt"))
            .await
            .unwrap();
        let second = store
            .create("users/u/journal", Write::new().set("text", "two").server_timestamp("createdAt"))
            .await
            .unwrap();

        let snapshot = subscription.try_next().unwrap();
        let ids: Vec<&str> = snapshot.iter().map(|doc| doc.id.as_str()).collect();
        assert_eq!(ids, vec![second.as_str(), first.as_str()]);
    }

    #[tokio::test]
    async fn test_timestamps_strictly_increase() {
        let store = InMemoryDocumentStore::new();
        for _ in 0..5 {
            store
                .create("c", Write::new().server_timestamp("createdAt"))
                .await
                .unwrap();
        }
        let docs = store
            .list("c", Query::new().order_by("createdAt", Direction::Ascending))
            .await
            .unwrap();
        let stamps: Vec<i64> = docs
            .iter()
            .map(|doc| doc.get("createdAt").and_then(Value::as_i64).unwrap())
            .collect();
        assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn test_set_merge_and_replace() {
        let store = InMemoryDocumentStore::new();
        store
            .set("users/u/progress/v1", Write::new().set("a", 1).set("b", 2), false)
            .await
            .unwrap();
        store
            .set("users/u/progress/v1", Write::new().set("b", 3), true)
            .await
            .unwrap();
        let doc = store.get_document("users/u/progress/v1").await.unwrap().unwrap();
        assert_eq!(doc.get("a"), Some(&Value::from(1)));
        assert_eq!(doc.get("b"), Some(&Value::from(3)));

        store
            .set("users/u/progress/v1", Write::new().set("c", 4), false)
            .await
            .unwrap();
        let doc = store.get_document("users/u/progress/v1").await.unwrap().unwrap();
        assert_eq!(doc.get("a"), None);
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let err = store
            .update("users/u/threads/nope", Write::new().set("title", "x"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_document_subscription_and_unsubscribe() {
        let store = InMemoryDocumentStore::new();
        let mut subscription = store.subscribe_document("users/u/progress/v1").await.unwrap();
        assert_eq!(subscription.next().await, Some(None));
        assert_eq!(store.active_listener_count(), 1);

        store
            .set("users/u/progress/v1", Write::new().set("completed", Vec::<String>::new()), true)
            .await
            .unwrap();
        assert!(subscription.try_next().unwrap().is_some());

        subscription.unsubscribe();
        assert_eq!(store.active_listener_count(), 0);
    }

    #[tokio::test]
    async fn test_unrelated_write_does_not_emit() {
        let store = InMemoryDocumentStore::new();
        let mut subscription = store
            .subscribe_collection("users/u/threads", Query::new().where_eq("agentId", "CODEX"))
            .await
            .unwrap();
        subscription.next().await;

        store
            .create("users/u/threads", Write::new().set("agentId", "PILLAR"))
            .await
            .unwrap();
        assert_eq!(subscription.try_next(), None);
    }

    #[tokio::test]
    async fn test_rejects_malformed_paths() {
        let store = InMemoryDocumentStore::new();
        assert!(store.create("users/u", Write::new()).await.unwrap_err().is_validation());
        assert!(store.get_document("users").await.unwrap_err().is_validation());
    }
}
