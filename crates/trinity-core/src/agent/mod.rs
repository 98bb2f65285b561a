//! Agent domain module.
//!
//! The three fixed conversational personas and their system prompts.
//!
//! # Module Structure
//!
//! - `model`: `AgentId` and the `Agent` descriptor
//! - `preset`: The built-in agents

mod model;
mod preset;

pub use model::{Agent, AgentId};
pub use preset::{AGENTS, agent};
