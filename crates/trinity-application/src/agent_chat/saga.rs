//! Send saga vocabulary.
//!
//! A send runs four store/model steps in order. Each step runs at most once;
//! a failed step ends the saga and nothing already written is undone.

use std::fmt;

/// Named steps of one send, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStep {
    WriteUserMessage,
    TouchThread,
    GenerateReply,
    WriteAssistantMessage,
}

impl SendStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendStep::WriteUserMessage => "write_user_message",
            SendStep::TouchThread => "touch_thread",
            SendStep::GenerateReply => "generate_reply",
            SendStep::WriteAssistantMessage => "write_assistant_message",
        }
    }
}

impl fmt::Display for SendStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a send did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Input was empty after trimming
    EmptyText,
    /// No thread is selected
    NoThread,
    /// Another send is still running; this one is dropped, not queued
    AlreadySending,
}

/// Result of [`super::AgentChat::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was written.
    Skipped(SkipReason),
    /// Both messages were written.
    Completed {
        user_message_id: String,
        assistant_message_id: String,
    },
    /// A store write failed at `step`; earlier steps stay committed.
    Aborted { step: SendStep, reason: String },
}

impl SendOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SendOutcome::Completed { .. })
    }
}

/// Observable activity of the chat view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPhase {
    #[default]
    Idle,
    Sending(SendStep),
}

impl ChatPhase {
    pub fn is_sending(&self) -> bool {
        matches!(self, ChatPhase::Sending(_))
    }
}
