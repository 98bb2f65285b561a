//! Application layer for Trinity.
//!
//! View-level use cases that coordinate the document store, the identity
//! gateway and the language-model client for one signed-in user.

pub mod agent_chat;
pub mod journal;
pub mod progress_tracker;
pub mod session_gate;

mod busy;

pub use agent_chat::{AgentChat, ChatPhase, ChatView, SendOutcome, SendStep, SkipReason, ViewMode};
pub use journal::Journal;
pub use progress_tracker::ProgressTracker;
pub use session_gate::{Route, SessionGate};
