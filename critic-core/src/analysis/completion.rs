//! Chat completion client for the AI review call

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::AiConfig;
use crate::{Error, Result};

/// Anything that can answer a system + user prompt pair
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Return the content of the first choice
    ///
    /// A non-success status is an [`Error::Upstream`]; an answer without a
    /// usable choice is an [`Error::MalformedResponse`].
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct ChatCompletionClient {
    http: reqwest::Client,
    config: AiConfig,
    api_key: Option<String>,
}

impl ChatCompletionClient {
    pub fn new(config: AiConfig, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            api_key,
        }
    }

    fn request_body<'a>(&'a self, system: &'a str, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

impl std::fmt::Debug for ChatCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionClient")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        debug!(endpoint = %self.config.endpoint, model = %self.config.model, "Requesting completion");

        let mut request = self
            .http
            .post(&self.config.endpoint)
            .json(&self.request_body(system, user));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "AI endpoint returned an error");
            return Err(Error::Upstream(format!("AI endpoint returned {}: {}", status, body)));
        }

        let body = response.text().await?;
        first_choice_content(&body)
    }
}

/// Pull the first choice's message content out of a raw response body
fn first_choice_content(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("unexpected completion body: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| Error::MalformedResponse("completion has no choices".to_string()))
}
