//! Language-model access for Trinity agents.
//!
//! [`GeminiApiAgent`] speaks the hosted generative-language REST API and
//! [`LanguageModelClient`] wraps any [`GenerativeBackend`] with the agent
//! prompts and the reply fallback policy.

pub mod backend;
pub mod gemini_api_agent;
pub mod language_model_client;

pub use backend::{GenerateRequest, GenerativeBackend, SamplingConfig, Turn, TurnRole};
pub use gemini_api_agent::GeminiApiAgent;
pub use language_model_client::{
    EMPTY_REPLY, FALLBACK_REPLY, HISTORY_WINDOW, LanguageModelClient,
};
