//! OpenAI-compatible chat completions client
//!
//! Works against any server exposing `POST {base}/chat/completions` in the
//! OpenAI format, including a local Ollama instance.
//!
//! ```ignore
//! let chat = OpenAiChatService::new("http://localhost:11434/v1", "ollama", "qwen2.5:7b")?
//!     .with_temperature(0.2);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use super::provider::ChatService;
use super::types::{AssistantMessage, Message, ToolCallRequest, ToolCatalog, Transcript};
use crate::config::AgentConfig;
use crate::error::ChatError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    tool_type: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    /// JSON-encoded argument object
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAiFunctionDefinition,
}

#[derive(Debug, Serialize)]
struct OpenAiFunctionDefinition {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    parameters: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

fn function_type() -> String {
    "function".to_string()
}

// ============================================================================
// OpenAiChatService
// ============================================================================

/// Chat service backed by an OpenAI-compatible endpoint
pub struct OpenAiChatService {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiChatService {
    /// Create a client for `api_base` (e.g. `http://localhost:11434/v1`)
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ChatError> {
        Self::with_timeout(api_base, api_key, model, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout
    pub fn with_timeout(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: None,
            max_tokens: None,
        })
    }

    /// Build from the process configuration
    pub fn from_config(config: &AgentConfig) -> Result<Self, ChatError> {
        tracing::info!("Creating OpenAI-compatible chat client");
        tracing::info!("Chat endpoint: {}", config.chat_base_url);
        tracing::info!("Using model: {}", config.model);

        let mut service = Self::with_timeout(
            &config.chat_base_url,
            &config.chat_api_key,
            &config.model,
            config.request_timeout,
        )?;
        service.temperature = config.temperature;
        service.max_tokens = config.max_tokens;
        Ok(service)
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the max tokens for responses
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn build_request(&self, transcript: &Transcript, catalog: &ToolCatalog) -> OpenAiRequest {
        OpenAiRequest {
            model: self.model.clone(),
            messages: convert_messages(transcript),
            tools: convert_tools(catalog),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    async fn send_request(&self, request: &OpenAiRequest) -> Result<OpenAiResponse, ChatError> {
        let url = format!("{}/chat/completions", self.api_base);

        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Ok(body) = serde_json::to_string(request) {
                tracing::debug!("[OpenAI] Request JSON: {}", body);
            }
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        tracing::debug!("[OpenAI] Response status: {}", status);
        tracing::debug!("[OpenAI] Response body: {}", response_text);

        if !status.is_success() {
            tracing::error!("[OpenAI] API error: {} - {}", status, response_text);
            return Err(ChatError::Status {
                status: status.as_u16(),
                body: response_text,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| ChatError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ChatService for OpenAiChatService {
    async fn complete(
        &self,
        transcript: &Transcript,
        catalog: &ToolCatalog,
    ) -> Result<AssistantMessage, ChatError> {
        tracing::info!("[OpenAI] Sending transcript with tools");
        tracing::debug!("[OpenAI] Messages count: {}", transcript.len());
        tracing::debug!("[OpenAI] Tools count: {}", catalog.len());

        let request = self.build_request(transcript, catalog);
        let response = self.send_request(&request).await?;
        convert_response(response)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

// ============================================================================
// Format conversion
// ============================================================================

fn convert_messages(transcript: &Transcript) -> Vec<OpenAiMessage> {
    transcript
        .iter()
        .map(|msg| match msg {
            Message::System { content } | Message::User { content } => OpenAiMessage {
                role: msg.role().to_string(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::Assistant {
                content,
                tool_calls,
            } => OpenAiMessage {
                role: "assistant".to_string(),
                content: content.clone(),
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls.iter().map(convert_tool_call).collect())
                },
                tool_call_id: None,
            },
            Message::Tool {
                tool_call_id,
                content,
                ..
            } => OpenAiMessage {
                role: "tool".to_string(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: Some(tool_call_id.clone()),
            },
        })
        .collect()
}

fn convert_tool_call(call: &ToolCallRequest) -> OpenAiToolCall {
    // Unparseable arguments are replayed to the model exactly as it sent them
    let arguments = match &call.arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    };

    OpenAiToolCall {
        id: call.id.clone(),
        tool_type: function_type(),
        function: OpenAiFunctionCall {
            name: call.name.clone(),
            arguments: Value::String(arguments),
        },
    }
}

fn convert_tools(catalog: &ToolCatalog) -> Option<Vec<OpenAiTool>> {
    if catalog.is_empty() {
        return None;
    }

    Some(
        catalog
            .iter()
            .map(|tool| OpenAiTool {
                tool_type: function_type(),
                function: OpenAiFunctionDefinition {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                    extra: tool.extra.clone(),
                },
            })
            .collect(),
    )
}

fn convert_response(response: OpenAiResponse) -> Result<AssistantMessage, ChatError> {
    if let Some(usage) = &response.usage {
        tracing::info!(
            "[OpenAI] Usage: {} prompt tokens, {} completion tokens (model {})",
            usage.prompt_tokens,
            usage.completion_tokens,
            response.model.as_deref().unwrap_or("unknown")
        );
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::Malformed("no choices in response".to_string()))?;

    tracing::debug!("[OpenAI] finish_reason={:?}", choice.finish_reason);

    let content = choice.message.content.filter(|text| !text.is_empty());
    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| {
            ToolCallRequest::new(call.id, call.function.name, parse_arguments(call.function.arguments))
        })
        .collect();

    Ok(AssistantMessage {
        content,
        tool_calls,
    })
}

/// Decode tool-call arguments. OpenAI sends a JSON-encoded string; some
/// compatible servers send the object directly.
fn parse_arguments(raw: Value) -> Value {
    match raw {
        Value::String(text) if text.trim().is_empty() => Value::Object(Default::default()),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("[OpenAI] Tool call arguments are not valid JSON: {}", e);
                Value::String(text)
            }
        },
        Value::Null => Value::Object(Default::default()),
        other => other,
    }
}
