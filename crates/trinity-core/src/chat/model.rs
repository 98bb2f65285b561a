//! Thread and message models.

use crate::agent::AgentId;
use crate::store::Write;
use serde::{Deserialize, Serialize};

/// Title given to a thread until its first message is sent.
pub const DEFAULT_THREAD_TITLE: &str = "New Conversation";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A named conversation with one agent.
///
/// The agent is fixed at creation. The title is overwritten once, by the
/// first message; `updated_at` advances on every send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub agent_id: AgentId,
    pub title: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Thread {
    /// Fields of a freshly created thread.
    pub fn new_write(agent_id: AgentId) -> Write {
        Write::new()
            .set("agentId", agent_id)
            .set("title", DEFAULT_THREAD_TITLE)
            .server_timestamp("createdAt")
            .server_timestamp("updatedAt")
    }
}

/// An immutable chat message inside a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub text: String,
    #[serde(default)]
    pub created_at: i64,
}

impl Message {
    /// Fields of a new message. The text is stored exactly as given.
    pub fn new_write(role: MessageRole, text: &str) -> Write {
        Write::new()
            .set("role", role.as_str())
            .set("text", text)
            .server_timestamp("createdAt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Document;

    #[test]
    fn test_thread_decodes_from_document() {
        let doc = Document::new("t1", Thread::new_write(AgentId::Codex).resolve(99));
        let thread: Thread = doc.decode().unwrap();

        assert_eq!(thread.id, "t1");
        assert_eq!(thread.agent_id, AgentId::Codex);
        assert_eq!(thread.title, DEFAULT_THREAD_TITLE);
        assert_eq!(thread.created_at, 99);
        assert_eq!(thread.updated_at, 99);
    }

    #[test]
    fn test_message_keeps_text_untouched() {
        let doc = Document::new("m1", Message::new_write(MessageRole::User, "  hi  ").resolve(1));
        let message: Message = doc.decode().unwrap();

        assert_eq!(message.role, MessageRole::User);
        assert_eq!(message.text, "  hi  ");
    }
}
