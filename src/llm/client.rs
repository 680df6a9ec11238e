//! Chat completion client for OpenAI-compatible endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ApiKey, Settings};
use crate::error::CompletionError;
use crate::prompt::Prompt;

/// One chat completion: a system + user instruction pair and sampling knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn from_prompt(prompt: Prompt, max_tokens: u32, temperature: f32) -> Self {
        Self {
            system: prompt.system,
            user: prompt.user,
            max_tokens,
            temperature,
        }
    }
}

/// Something that turns a request into the model's reply text.
///
/// Implementations must be shareable across concurrently running tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`CompletionClient`] that POSTs to `{base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    url: String,
    model: String,
    api_key: ApiKey,
}

impl OpenAiClient {
    pub fn new(api_key: ApiKey, settings: &Settings) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("diffscribe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CompletionError::ClientBuild)?;

        Ok(Self {
            http,
            url: settings.completions_url(),
            model: settings.model.clone(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!("POST {} (model {})", self.url, self.model);
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(CompletionError::Http)?;

        let status = response.status();
        let text = response.text().await.map_err(CompletionError::Http)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| text.trim().to_string());
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::NoChoices)?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "usr",
                },
            ],
            max_tokens: 2000,
            temperature: 0.5,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "gpt-4",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "usr"}
                ],
                "max_tokens": 2000,
                "temperature": 0.5
            })
        );
    }

    #[test]
    fn test_null_content_parses() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert_eq!(parsed.choices[0].message.content, None);
    }

    #[test]
    fn test_from_prompt_copies_instructions() {
        let request = CompletionRequest::from_prompt(
            Prompt {
                system: "s".to_string(),
                user: "u".to_string(),
            },
            10,
            0.7,
        );
        assert_eq!(request.system, "s");
        assert_eq!(request.user, "u");
        assert_eq!(request.max_tokens, 10);
    }
}
