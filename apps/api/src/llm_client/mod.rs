/// LLM Gateway: the single point of entry for all model calls in NUCLEA.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// All LLM interactions MUST go through this module.
///
/// The provider is chosen once, at construction, from resolved credentials:
/// OpenAI when its key is present, otherwise Anthropic, otherwise offline demo data.
/// A call never fails from the caller's point of view; any provider error is logged
/// and answered from the offline responder instead.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ProviderCredentials;

pub mod demo;

use demo::demo_response;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const OPENAI_MODEL: &str = "gpt-4o-mini";
pub const ANTHROPIC_MODEL: &str = "claude-3-haiku-20240307";
pub const OFFLINE_MODEL: &str = "offline-demo";

const TEMPERATURE: f32 = 0.3;
const ANTHROPIC_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Anything that can answer a prompt with text. The analysis pipeline depends on
/// this rather than on [`LlmGateway`] so stages can be driven by scripted output.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, prompt: &str, system: Option<&str>) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Offline,
}

enum Provider {
    OpenAi {
        client: Client,
        api_key: String,
        endpoint: String,
    },
    Anthropic {
        client: Client,
        api_key: String,
        endpoint: String,
    },
    Offline,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    /// Text of the first text block.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

/// Both providers wrap error details as `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Gateway
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmGateway {
    provider: Provider,
}

impl LlmGateway {
    pub fn new(credentials: &ProviderCredentials, timeout: Duration) -> Self {
        Self::with_endpoints(credentials, timeout, OPENAI_API_URL, ANTHROPIC_API_URL)
    }

    /// A gateway that only ever serves demo data.
    pub fn offline() -> Self {
        Self {
            provider: Provider::Offline,
        }
    }

    fn with_endpoints(
        credentials: &ProviderCredentials,
        timeout: Duration,
        openai_endpoint: &str,
        anthropic_endpoint: &str,
    ) -> Self {
        let selected = match (&credentials.openai_api_key, &credentials.anthropic_api_key) {
            (Some(key), _) => Some((ProviderKind::OpenAi, key.clone())),
            (None, Some(key)) => Some((ProviderKind::Anthropic, key.clone())),
            (None, None) => None,
        };

        let Some((kind, api_key)) = selected else {
            warn!("No API key configured. Serving demo data for every analysis.");
            return Self::offline();
        };

        let client = match Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                warn!("Failed to build HTTP client ({e}). Falling back to demo data.");
                return Self::offline();
            }
        };

        let provider = match kind {
            ProviderKind::OpenAi => Provider::OpenAi {
                client,
                api_key,
                endpoint: openai_endpoint.to_string(),
            },
            _ => Provider::Anthropic {
                client,
                api_key,
                endpoint: anthropic_endpoint.to_string(),
            },
        };

        Self { provider }
    }

    pub fn kind(&self) -> ProviderKind {
        match self.provider {
            Provider::OpenAi { .. } => ProviderKind::OpenAi,
            Provider::Anthropic { .. } => ProviderKind::Anthropic,
            Provider::Offline => ProviderKind::Offline,
        }
    }

    pub fn model(&self) -> &'static str {
        match self.provider {
            Provider::OpenAi { .. } => OPENAI_MODEL,
            Provider::Anthropic { .. } => ANTHROPIC_MODEL,
            Provider::Offline => OFFLINE_MODEL,
        }
    }
}

#[async_trait]
impl Completer for LlmGateway {
    async fn complete(&self, prompt: &str, system: Option<&str>) -> String {
        let outcome = match &self.provider {
            Provider::Offline => {
                debug!("Offline gateway: serving demo response");
                return demo_response(prompt).to_string();
            }
            Provider::OpenAi {
                client,
                api_key,
                endpoint,
            } => call_openai(client, endpoint, api_key, prompt, system).await,
            Provider::Anthropic {
                client,
                api_key,
                endpoint,
            } => call_anthropic(client, endpoint, api_key, prompt, system).await,
        };

        match outcome {
            Ok(text) => text,
            Err(e) => {
                warn!("{:?} call failed, using demo data: {e}", self.kind());
                demo_response(prompt).to_string()
            }
        }
    }
}

async fn call_openai(
    client: &Client,
    endpoint: &str,
    api_key: &str,
    prompt: &str,
    system: Option<&str>,
) -> Result<String, LlmError> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: prompt,
    });

    let request_body = OpenAiRequest {
        model: OPENAI_MODEL,
        messages,
        temperature: TEMPERATURE,
    };

    let response = client
        .post(endpoint)
        .bearer_auth(api_key)
        .json(&request_body)
        .send()
        .await?;

    let response: OpenAiResponse = check_status(response).await?.json().await?;

    if let Some(usage) = &response.usage {
        debug!(
            "OpenAI call succeeded: prompt_tokens={}, completion_tokens={}",
            usage.prompt_tokens, usage.completion_tokens
        );
    }

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(LlmError::EmptyContent)
}

async fn call_anthropic(
    client: &Client,
    endpoint: &str,
    api_key: &str,
    prompt: &str,
    system: Option<&str>,
) -> Result<String, LlmError> {
    let request_body = AnthropicRequest {
        model: ANTHROPIC_MODEL,
        max_tokens: ANTHROPIC_MAX_TOKENS,
        temperature: TEMPERATURE,
        system: system.unwrap_or_default(),
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
    };

    let response = client
        .post(endpoint)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&request_body)
        .send()
        .await?;

    let response: AnthropicResponse = check_status(response).await?.json().await?;

    if let Some(usage) = &response.usage {
        debug!(
            "Anthropic call succeeded: input_tokens={}, output_tokens={}",
            usage.input_tokens, usage.output_tokens
        );
    }

    response
        .text()
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or(LlmError::EmptyContent)
}

/// Turns a non-2xx response into `LlmError::Api`, preferring the provider's message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(LlmError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Unwraps a ```json ... ``` (or bare ``` ... ```) block around model output.
/// Text without a leading fence is returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an info string such as `json` up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) if rest[..idx].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[idx + 1..]
        }
        _ => rest,
    };
    let body = body.trim();
    body.strip_suffix("```").map(str::trim).unwrap_or(body)
}
