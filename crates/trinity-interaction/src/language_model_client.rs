//! Agent-aware reply generation with a fixed fallback policy.

use crate::backend::{GenerateRequest, GenerativeBackend, SamplingConfig, Turn, TurnRole};
use crate::gemini_api_agent::GeminiApiAgent;
use std::sync::Arc;
use trinity_core::agent::{self, AgentId};
use trinity_core::chat::{Message, MessageRole};
use trinity_core::config::TrinityConfig;
use trinity_core::error::{Result, TrinityError};

/// Number of prior messages sent as conversation history.
pub const HISTORY_WINDOW: usize = 5;

/// Reply used when the model call fails for any reason.
pub const FALLBACK_REPLY: &str =
    "The Trinity frequency is currently oscillating. Let's try that again shortly.";

/// Reply used when the model answers without text.
pub const EMPTY_REPLY: &str = "I am reflecting on your words. Please try again in a moment.";

const MISSING_KEY_MESSAGE: &str = "Gemini API key is not configured in environment.";

/// Produces agent replies.
///
/// Only a missing credential is reported as an error. Transport and API
/// failures are logged and turned into [`FALLBACK_REPLY`].
#[derive(Clone)]
pub struct LanguageModelClient {
    backend: Option<Arc<dyn GenerativeBackend>>,
    sampling: SamplingConfig,
}

impl LanguageModelClient {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend: Some(backend),
            sampling: SamplingConfig::default(),
        }
    }

    /// A client without credentials; every completion is rejected.
    pub fn unconfigured() -> Self {
        Self {
            backend: None,
            sampling: SamplingConfig::default(),
        }
    }

    /// Builds a Gemini-backed client when an API key is configured.
    pub fn from_config(config: &TrinityConfig) -> Self {
        match config.gemini_api_key() {
            Some(api_key) => Self::new(Arc::new(GeminiApiAgent::new(api_key, config.model()))),
            None => {
                tracing::warn!("No Gemini API key configured; agent replies are disabled");
                Self::unconfigured()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Fails with a configuration error when no credential is present.
    pub fn ensure_configured(&self) -> Result<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(TrinityError::config(MISSING_KEY_MESSAGE))
        }
    }

    /// Generates the agent's reply to `user_message`.
    ///
    /// Only the last [`HISTORY_WINDOW`] entries of `history` are used;
    /// `user_message` must not be part of it.
    ///
    /// # Errors
    ///
    /// `TrinityError::Config` when no API key is configured. Nothing else
    /// is propagated.
    pub async fn complete(
        &self,
        agent_id: AgentId,
        user_message: &str,
        history: &[Message],
        extra_context: Option<&str>,
    ) -> Result<String> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| TrinityError::config(MISSING_KEY_MESSAGE))?;

        let request = self.build_request(agent_id, user_message, history, extra_context);
        tracing::debug!(
            agent = %agent_id,
            model = backend.model(),
            turns = request.contents.len(),
            "Requesting agent reply"
        );

        match backend.generate(&request).await {
            Ok(Some(text)) if !text.trim().is_empty() => Ok(text),
            Ok(_) => {
                tracing::warn!(agent = %agent_id, "Model returned an empty reply");
                Ok(EMPTY_REPLY.to_string())
            }
            Err(err) => {
                tracing::error!(agent = %agent_id, error = %err, "Model request failed");
                Ok(FALLBACK_REPLY.to_string())
            }
        }
    }

    fn build_request(
        &self,
        agent_id: AgentId,
        user_message: &str,
        history: &[Message],
        extra_context: Option<&str>,
    ) -> GenerateRequest {
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        let mut contents: Vec<Turn> = history[start..]
            .iter()
            .map(|message| {
                let role = match message.role {
                    MessageRole::User => TurnRole::User,
                    MessageRole::Assistant => TurnRole::Model,
                };
                Turn::new(role, message.text.clone())
            })
            .collect();
        contents.push(Turn::new(TurnRole::User, user_message));

        let mut system_instruction = agent::agent(agent_id).system_prompt.to_string();
        if let Some(context) = extra_context {
            system_instruction.push_str("\n\nCONTEXT FOR CURRENT SESSION: ");
            system_instruction.push_str(context);
        }

        GenerateRequest {
            system_instruction,
            contents,
            sampling: self.sampling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Replays a fixed outcome and records requests.
    struct ScriptedBackend {
        outcome: Result<Option<String>>,
        requests: Mutex<Vec<GenerateRequest>>,
    }

    impl ScriptedBackend {
        fn new(outcome: Result<Option<String>>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GenerativeBackend for ScriptedBackend {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>> {
            self.requests.lock().await.push(request.clone());
            self.outcome.clone()
        }
    }

    fn message(role: MessageRole, text: &str) -> Message {
        Message {
            id: text.to_string(),
            role,
            text: text.to_string(),
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn test_history_window_and_role_mapping() {
        let backend = ScriptedBackend::new(Ok(Some("ok".into())));
        let client = LanguageModelClient::new(backend.clone());
        let history: Vec<Message> = (0..7)
            .map(|i| {
                let role = if i % 2 == 0 { MessageRole::User } else { MessageRole::Assistant };
                message(role, &format!("m{i}"))
            })
            .collect();

        let reply = client
            .complete(AgentId::Codex, "now", &history, None)
            .await
            .unwrap();
        assert_eq!(reply, "ok");

        let requests = backend.requests.lock().await;
        let turns: Vec<(&str, &str)> = requests[0]
            .contents
            .iter()
            .map(|turn| (turn.role.as_str(), turn.text.as_str()))
            .collect();
        assert_eq!(
            turns,
            vec![
                ("user", "m2"),
                ("model", "m3"),
                ("user", "m4"),
                ("model", "m5"),
                ("user", "m6"),
                ("user", "now"),
            ]
        );
    }

    #[tokio::test]
    async fn test_extra_context_is_appended_to_system_prompt() {
        let backend = ScriptedBackend::new(Ok(Some("ok".into())));
        let client = LanguageModelClient::new(backend.clone());

        client
            .complete(AgentId::Pillar, "hi", &[], Some("week 3"))
            .await
            .unwrap();

        let requests = backend.requests.lock().await;
        let expected = format!(
            "{}\n\nCONTEXT FOR CURRENT SESSION: week 3",
            agent::agent(AgentId::Pillar).system_prompt
        );
        assert_eq!(requests[0].system_instruction, expected);
        assert_eq!(requests[0].sampling, SamplingConfig::default());
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_fallback_reply() {
        let backend = ScriptedBackend::new(Err(TrinityError::transport(None, "offline")));
        let client = LanguageModelClient::new(backend);

        let reply = client.complete(AgentId::ComeUp, "hi", &[], None).await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_empty_response_becomes_reflecting_reply() {
        for outcome in [Ok(None), Ok(Some("   ".to_string()))] {
            let client = LanguageModelClient::new(ScriptedBackend::new(outcome));
            let reply = client.complete(AgentId::Codex, "hi", &[], None).await.unwrap();
            assert_eq!(reply, EMPTY_REPLY);
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_a_config_error() {
        let client = LanguageModelClient::from_config(&TrinityConfig::default());
        assert!(!client.is_configured());
        assert!(client.ensure_configured().unwrap_err().is_config());

        let err = client.complete(AgentId::Pillar, "hi", &[], None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Gemini API key is not configured in environment."
        );
    }
}
