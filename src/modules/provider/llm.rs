/// LLM completion client.
///
/// The pipeline treats generated text as untrusted: structure is validated
/// by the consuming stage, never here.
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const API_VERSION: &str = "2023-06-01";

/// One turn of a tutoring conversation, as sent over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a single-turn prompt and return the generated text.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> AppResult<String>;

    /// Continue a multi-turn conversation under a system prompt and return
    /// the next assistant reply.
    async fn chat(
        &self,
        system: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> AppResult<String>;
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

pub struct AnthropicClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new() -> AppResult<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| {
            AppError::InternalError("ANTHROPIC_API_KEY environment variable not found".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            api_key,
            model: env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
        })
    }

    async fn send(&self, request: &MessagesRequest<'_>) -> AppResult<String> {
        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ApiError(format!(
                "Completion request failed with HTTP {}: {}",
                status, body
            )));
        }

        let parsed = response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| AppError::ApiError(format!("Failed to parse completion response: {}", e)))?;

        let text = parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::ApiError(
                "Completion response contained no text".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> AppResult<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            system: None,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        self.send(&request).await
    }

    async fn chat(
        &self,
        system: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> AppResult<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            system: Some(system),
            messages: messages
                .iter()
                .map(|m| Message {
                    role: match m.role {
                        ChatRole::User => "user",
                        ChatRole::Assistant => "assistant",
                    },
                    content: &m.content,
                })
                .collect(),
        };

        self.send(&request).await
    }
}
