//! Document store trait.

use super::document::{Document, Write};
use super::query::Query;
use super::subscription::{CollectionSubscription, DocumentSubscription};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract hierarchical document database.
///
/// Paths alternate collection and document segments
/// (`users/{uid}/threads/{id}/messages`). Collection operations take a
/// collection path, document operations a document path.
///
/// # Consistency
///
/// Callers must not expect read-after-write through a write's return value.
/// A write that affects a rendered value is observed through the
/// subscription that renders it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Opens a live query. Emits the full ordered result on every change.
    async fn subscribe_collection(&self, path: &str, query: Query) -> Result<CollectionSubscription>;

    /// Opens a live view of one document.
    async fn subscribe_document(&self, path: &str) -> Result<DocumentSubscription>;

    /// Runs a query once.
    async fn list(&self, path: &str, query: Query) -> Result<Vec<Document>>;

    /// Reads one document once.
    async fn get_document(&self, path: &str) -> Result<Option<Document>>;

    /// Creates a document with a store-assigned id and returns the id.
    async fn create(&self, collection_path: &str, write: Write) -> Result<String>;

    /// Writes a document. With `merge`, untouched fields are preserved;
    /// otherwise the document is replaced. Creates the document if missing.
    async fn set(&self, document_path: &str, write: Write, merge: bool) -> Result<()>;

    /// Merges fields into an existing document.
    ///
    /// # Errors
    ///
    /// `NotFound` when the document does not exist.
    async fn update(&self, document_path: &str, write: Write) -> Result<()>;
}
