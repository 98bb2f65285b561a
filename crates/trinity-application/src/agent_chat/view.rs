//! Chat view projection.

use serde::de::DeserializeOwned;
use trinity_core::agent::AgentId;
use trinity_core::chat::{Message, Thread};
use trinity_core::store::Document;

/// Which pane of the chat is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    ThreadList,
    Conversation,
}

/// Snapshot of everything the chat view renders.
///
/// `threads` and `messages` are replaced wholesale from the latest store
/// snapshot, never patched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatView {
    pub agent_id: AgentId,
    /// Threads of `agent_id`, most recently updated first
    pub threads: Vec<Thread>,
    pub current_thread_id: Option<String>,
    /// Messages of the current thread, oldest first
    pub messages: Vec<Message>,
    pub input: String,
    pub mode: ViewMode,
    pub loading_threads: bool,
    pub loading_messages: bool,
}

impl ChatView {
    pub(crate) fn for_agent(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            loading_threads: true,
            ..Self::default()
        }
    }

    pub fn current_thread(&self) -> Option<&Thread> {
        let id = self.current_thread_id.as_deref()?;
        self.threads.iter().find(|thread| thread.id == id)
    }
}

/// Decodes a snapshot, skipping documents that do not fit the entity.
pub(crate) fn decode_all<T: DeserializeOwned>(documents: &[Document]) -> Vec<T> {
    documents
        .iter()
        .filter_map(|doc| match doc.decode() {
            Ok(entity) => Some(entity),
            Err(err) => {
                tracing::warn!(id = %doc.id, error = %err, "Skipping malformed document");
                None
            }
        })
        .collect()
}
