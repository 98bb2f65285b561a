//! Backend abstraction for text generation.

use async_trait::async_trait;
use trinity_core::error::Result;

/// Speaker of a transcript turn, in the generative API's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_k: 40,
            top_p: 0.95,
        }
    }
}

/// One generation call: a system instruction plus an ordered transcript
/// ending with the user's new message.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub system_instruction: String,
    pub contents: Vec<Turn>,
    pub sampling: SamplingConfig,
}

/// A text-generation service.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Model identifier used for requests.
    fn model(&self) -> &str;

    /// Generates a reply. `Ok(None)` means the service answered without text.
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>>;
}
