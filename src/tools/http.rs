//! HTTP tool service client
//!
//! Talks to a tool server exposing:
//! - `GET  {base}/api/tools`      → `{"tools": [...]}`
//! - `POST {base}/api/tools/call` → `{"result": "..."}` or `{"error": "..."}`
//!
//! Call bodies carry the arguments as a JSON-encoded string:
//! `{"name": "search", "arguments": "{\"query\":\"sublime\"}"}`

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use super::tool::ToolService;
use crate::config::AgentConfig;
use crate::error::ToolError;
use crate::llm::{ToolCatalog, ToolDefinition};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const TOOLS_PATH: &str = "/api/tools";
const CALL_PATH: &str = "/api/tools/call";

/// Keys a catalog entry may use for its argument schema
const SCHEMA_KEYS: [&str; 3] = ["parameters", "input_schema", "inputSchema"];

/// Catalog response
#[derive(Debug, Deserialize)]
struct ToolListResponse {
    tools: Vec<Map<String, Value>>,
}

/// Build a tool definition from a catalog entry.
///
/// Entries come either in OpenAI function shape (`{"type": "function",
/// "function": {...}}`) or as a flat descriptor. Fields other than the name,
/// description and schema are kept so they reach the chat service unchanged.
fn tool_from_entry(mut entry: Map<String, Value>) -> Result<ToolDefinition, ToolError> {
    let mut descriptor = match entry.remove("function") {
        Some(Value::Object(function)) => function,
        _ => {
            entry.remove("type");
            entry
        }
    };

    let name = match descriptor.remove("name") {
        Some(Value::String(name)) => name,
        other => {
            return Err(ToolError::Malformed(format!(
                "catalog entry has no tool name: {:?}",
                other
            )))
        }
    };

    let description = match descriptor.remove("description") {
        Some(Value::String(text)) => Some(text),
        _ => None,
    };

    let mut parameters = None;
    for key in SCHEMA_KEYS {
        if let Some(schema) = descriptor.remove(key) {
            parameters.get_or_insert(schema);
        }
    }

    Ok(ToolDefinition {
        name,
        description,
        parameters: parameters
            .unwrap_or_else(|| serde_json::json!({ "type": "object", "properties": {} })),
        extra: descriptor,
    })
}

/// Request body for `POST /api/tools/call`
#[derive(Debug, Serialize)]
struct ToolCallBody<'a> {
    name: &'a str,
    /// JSON-encoded arguments object, the same form the chat wire carries
    arguments: String,
}

impl<'a> ToolCallBody<'a> {
    fn new(name: &'a str, arguments: &Value) -> Self {
        Self {
            name,
            arguments: arguments.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolCallResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Tool service reached over HTTP
pub struct HttpToolService {
    client: Client,
    base_url: String,
}

impl HttpToolService {
    /// Create a client for the tool server at `base_url` (e.g. `http://localhost:3000`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ToolError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ToolError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build from the process configuration
    pub fn from_config(config: &AgentConfig) -> Result<Self, ToolError> {
        tracing::info!("Tool service endpoint: {}", config.tool_base_url);
        Self::with_timeout(&config.tool_base_url, config.request_timeout)
    }
}

#[async_trait]
impl ToolService for HttpToolService {
    async fn list_tools(&self) -> Result<ToolCatalog, ToolError> {
        let url = format!("{}{}", self.base_url, TOOLS_PATH);
        tracing::info!("[ToolService] Fetching tool catalog from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("[ToolService] Catalog request failed: {} - {}", status, body);
            return Err(ToolError::Malformed(format!(
                "catalog request returned {}: {}",
                status, body
            )));
        }

        let catalog = parse_catalog(&body)?;
        tracing::info!(
            "[ToolService] Got {} tools: {:?}",
            catalog.len(),
            catalog.names()
        );
        Ok(catalog)
    }

    async fn call(&self, name: &str, arguments: &Value) -> Result<String, ToolError> {
        let url = format!("{}{}", self.base_url, CALL_PATH);
        tracing::debug!("[ToolService] POST {} name={} args={}", url, name, arguments);

        let response = self
            .client
            .post(&url)
            .json(&ToolCallBody::new(name, arguments))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("[ToolService] Response status: {}", status);
        tracing::debug!("[ToolService] Response body: {}", body);

        parse_call_response(name, status.as_u16(), &body)
    }
}

fn parse_catalog(body: &str) -> Result<ToolCatalog, ToolError> {
    let response: ToolListResponse =
        serde_json::from_str(body).map_err(|e| ToolError::Malformed(e.to_string()))?;
    let tools = response
        .tools
        .into_iter()
        .map(tool_from_entry)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ToolCatalog::new(tools))
}

/// Interpret a tool call response.
///
/// A reachable service that reports a problem (error field or non-2xx
/// status) is a tool failure the model can react to. A 2xx body that
/// carries neither a result nor an error is a broken service.
fn parse_call_response(tool: &str, status: u16, body: &str) -> Result<String, ToolError> {
    let parsed: Option<ToolCallResponse> = serde_json::from_str(body).ok();
    let success = (200..300).contains(&status);

    if let Some(error) = parsed.as_ref().and_then(|r| r.error.as_ref()) {
        return Err(ToolError::Execution {
            tool: tool.to_string(),
            message: value_to_text(error),
        });
    }

    if !success {
        return Err(ToolError::Execution {
            tool: tool.to_string(),
            message: format!("tool service returned {}: {}", status, body.trim()),
        });
    }

    match parsed.and_then(|r| r.result) {
        Some(result) => Ok(value_to_text(&result)),
        None => Err(ToolError::Malformed(format!(
            "response for '{}' has no result field: {}",
            tool, body
        ))),
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
