//! Chat domain module.
//!
//! Threads (agent-scoped conversations) and their messages.
//!
//! # Module Structure
//!
//! - `model`: `Thread`, `Message` and `MessageRole`
//! - `format`: Title and timestamp formatting

mod format;
mod model;

pub use format::{TITLE_MAX_CHARS, format_timestamp, format_timestamp_with_year, thread_title_for};
pub use model::{DEFAULT_THREAD_TITLE, Message, MessageRole, Thread};
