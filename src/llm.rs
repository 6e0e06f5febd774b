use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ChatBridgeError;

/// Network deadline for one completion call, connect through body read.
pub const API_TIMEOUT: Duration = Duration::from_secs(30);
/// Sampling temperature, fixed for every request.
pub const TEMPERATURE: f64 = 0.7;
/// Ceiling on generated tokens per answer.
pub const MAX_COMPLETION_TOKENS: u32 = 2000;
/// Returned as a successful answer when the provider sends no choices.
pub const NO_ANSWER_FALLBACK: &str = "Sorry, I could not get an answer from the model.";

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ChatBridgeError>;
}

/// Client for an OpenAI-compatible chat-completions endpoint (DeepSeek,
/// OpenAI, OpenRouter, Groq, local gateways). One request per answer; a
/// failed or rejected call is surfaced immediately, never retried.
pub struct ChatCompletionClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    chat_url: String,
}

impl ChatCompletionClient {
    pub fn new(config: &Config) -> Result<Self, ChatBridgeError> {
        let base = config.llm_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let chat_url = format!("{}/chat/completions", base.trim_end_matches('/'));

        let http = reqwest::Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|e| ChatBridgeError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(ChatCompletionClient {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            chat_url,
        })
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl CompletionProvider for ChatCompletionClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ChatBridgeError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatRequestMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatRequestMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        debug!(
            "Sending completion request to {} (model {})",
            self.chat_url, self.model
        );
        let started = std::time::Instant::now();

        let response = self
            .http
            .post(&self.chat_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        info!(
            "Completion response: status={} elapsed_ms={} bytes={}",
            status.as_u16(),
            started.elapsed().as_millis(),
            body.len()
        );

        interpret_response(status.as_u16(), &body)
    }
}

/// Applies the response contract: non-2xx and in-body error objects are
/// rejections carrying the provider's own words; an empty choice list is a
/// successful fallback answer; otherwise the first choice, trimmed.
fn interpret_response(status: u16, body: &str) -> Result<String, ChatBridgeError> {
    if !(200..300).contains(&status) {
        return Err(ChatBridgeError::ProviderRejected {
            status,
            body: body.to_string(),
        });
    }

    let parsed: ChatResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            return Err(ChatBridgeError::ProviderRejected {
                status,
                body: format!("Failed to parse response: {e}\nBody: {body}"),
            });
        }
    };

    if let Some(err) = parsed.error {
        return Err(ChatBridgeError::ProviderRejected {
            status,
            body: err.message,
        });
    }

    match parsed.choices.first() {
        Some(choice) => Ok(choice.message.content.trim().to_string()),
        None => Ok(NO_ANSWER_FALLBACK.to_string()),
    }
}
