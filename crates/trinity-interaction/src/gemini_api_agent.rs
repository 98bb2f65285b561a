//! GeminiApiAgent - Direct REST API implementation for Gemini.
//!
//! Calls `models/{model}:generateContent` with the API key as a query
//! parameter. Failures are reported as `TrinityError::Transport`; the
//! fallback policy lives in [`crate::LanguageModelClient`].

use crate::backend::{GenerateRequest, GenerativeBackend};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use trinity_core::config::DEFAULT_GEMINI_MODEL;
use trinity_core::error::{Result, TrinityError};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Backend that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiApiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Creates an agent using `gemini-3-flash-preview`.
    pub fn with_default_model(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_GEMINI_MODEL)
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Points the agent at another endpoint prefix (up to `/models`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<Option<String>> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                TrinityError::transport(None, format!("Gemini API request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            TrinityError::transport(None, format!("Failed to parse Gemini response: {err}"))
        })?;

        Ok(extract_text_response(parsed))
    }
}

#[async_trait]
impl GenerativeBackend for GeminiApiAgent {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>> {
        self.send_request(&GenerateContentRequest::from(request)).await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

impl From<&GenerateRequest> for GenerateContentRequest {
    fn from(request: &GenerateRequest) -> Self {
        Self {
            contents: request
                .contents
                .iter()
                .map(|turn| Content {
                    role: Some(turn.role.as_str().to_string()),
                    parts: vec![Part {
                        text: turn.text.clone(),
                    }],
                })
                .collect(),
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: request.system_instruction.clone(),
                }],
            },
            generation_config: GenerationConfig {
                temperature: request.sampling.temperature,
                top_k: request.sampling.top_k,
                top_p: request.sampling.top_p,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Concatenates the text parts of the first candidate.
fn extract_text_response(response: GenerateContentResponse) -> Option<String> {
    let content = response
        .candidates?
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)?;
    let text: String = content
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();
    if text.is_empty() { None } else { Some(text) }
}

fn map_http_error(status: StatusCode, body: String) -> TrinityError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    TrinityError::transport(Some(status.as_u16()), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SamplingConfig, Turn, TurnRole};
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest {
            system_instruction: "Be brief.".into(),
            contents: vec![
                Turn::new(TurnRole::User, "hi"),
                Turn::new(TurnRole::Model, "hello"),
                Turn::new(TurnRole::User, "again"),
            ],
            sampling: SamplingConfig::default(),
        };
        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "again");
        assert_eq!(body["systemInstruction"], json!({ "parts": [{ "text": "Be brief." }] }));
        assert_eq!(body["generationConfig"]["topK"], 40);
    }

    #[test]
    fn test_text_parts_are_joined() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hel" }, { "text": "lo" }] } }]
        }))
        .unwrap();
        assert_eq!(extract_text_response(parsed), Some("Hello".to_string()));

        let empty: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert_eq!(extract_text_response(empty), None);
    }

    #[test]
    fn test_http_error_keeps_status_and_message() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#
                .to_string(),
        );
        assert_eq!(
            err,
            TrinityError::transport(Some(429), "RESOURCE_EXHAUSTED: Quota exceeded")
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_transport_error() {
        let agent = GeminiApiAgent::with_default_model("key").with_base_url("http://127.0.0.1:9");
        let request = GenerateRequest {
            system_instruction: String::new(),
            contents: vec![Turn::new(TurnRole::User, "hi")],
            sampling: SamplingConfig::default(),
        };
        let err = agent.generate(&request).await.unwrap_err();
        assert!(matches!(err, TrinityError::Transport { status_code: None, .. }));
    }
}
