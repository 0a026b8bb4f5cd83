//! Conversation types shared by the agent loop and the chat/tool services
//!
//! The transcript is a flat list of role-tagged messages in the order they
//! are shown to the model. Tool results reference the call that produced
//! them through `tool_call_id`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::Deref;
use std::sync::Arc;

/// A single tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Identifier assigned by the chat service, unique within one response
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// Structured arguments.
    ///
    /// If the model emitted text that is not valid JSON, the raw text is kept
    /// as a `Value::String` so the failure can be reported back to the model.
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Result of one tool invocation, correlated to its request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub call_id: String,
    pub content: String,
    pub is_error: bool,
}

impl ToolCallResult {
    /// Create a successful result
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Create a failed result. The content is prefixed so the model can tell
    /// a failure apart from tool output.
    pub fn error(call_id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self {
            call_id: call_id.into(),
            content: format!("Error: {}", message),
            is_error: true,
        }
    }
}

/// The message produced by one chat-service completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl AssistantMessage {
    /// A terminal message carrying only text
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A non-terminal message requesting tool calls
    pub fn with_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    /// True when the model asked for no tools, ending the run
    pub fn is_terminal(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

/// A transcript message, tagged by role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        tool_call_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// Role name as used on the wire
    pub fn role(&self) -> &'static str {
        match self {
            Message::System { .. } => "system",
            Message::User { .. } => "user",
            Message::Assistant { .. } => "assistant",
            Message::Tool { .. } => "tool",
        }
    }
}

impl From<AssistantMessage> for Message {
    fn from(msg: AssistantMessage) -> Self {
        Message::Assistant {
            content: msg.content,
            tool_calls: msg.tool_calls,
        }
    }
}

impl From<ToolCallResult> for Message {
    fn from(result: ToolCallResult) -> Self {
        Message::Tool {
            tool_call_id: result.call_id,
            content: result.content,
            is_error: result.is_error,
        }
    }
}

/// Ordered, append-only conversation for a single run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Start a transcript with the system instruction and the user task
    pub fn new(system_prompt: impl Into<String>, user_task: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(user_task)],
        }
    }

    /// Append a message
    pub fn push(&mut self, message: impl Into<Message>) {
        self.messages.push(message.into());
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Messages added after the initial system and user messages
    pub fn exchange(&self) -> &[Message] {
        &self.messages[2.min(self.messages.len())..]
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Descriptor of a tool offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the arguments object
    #[serde(default = "empty_object_schema")]
    pub parameters: Value,
    /// Any other descriptor fields (such as `strict`), passed through to the
    /// chat service untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            parameters,
            extra: Map::new(),
        }
    }
}

/// Immutable set of tool descriptors for a run.
///
/// Cloning shares the underlying list, so one catalog can be handed to any
/// number of concurrent runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCatalog {
    tools: Arc<[ToolDefinition]>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<ToolDefinition>) -> Self {
        Self {
            tools: tools.into(),
        }
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    /// True if both catalogs share the same allocation
    pub fn ptr_eq(&self, other: &ToolCatalog) -> bool {
        Arc::ptr_eq(&self.tools, &other.tools)
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Deref for ToolCatalog {
    type Target = [ToolDefinition];

    fn deref(&self) -> &Self::Target {
        &self.tools
    }
}

impl From<Vec<ToolDefinition>> for ToolCatalog {
    fn from(tools: Vec<ToolDefinition>) -> Self {
        Self::new(tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transcript_starts_with_system_and_user() {
        let transcript = Transcript::new("be helpful", "do the thing");
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].role(), "system");
        assert_eq!(transcript.messages()[1].role(), "user");
        assert!(transcript.exchange().is_empty());
    }

    #[test]
    fn test_transcript_push_preserves_order() {
        let mut transcript = Transcript::new("sys", "task");
        transcript.push(AssistantMessage::with_tool_calls(vec![ToolCallRequest::new(
            "t1",
            "search",
            json!({}),
        )]));
        transcript.push(ToolCallResult::success("t1", "ok"));

        let roles: Vec<_> = transcript.iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "tool"]);
        assert_eq!(transcript.exchange().len(), 2);
    }

    #[test]
    fn test_tool_result_error_prefix() {
        let result = ToolCallResult::error("t1", "tool exploded");
        assert!(result.is_error);
        assert_eq!(result.content, "Error: tool exploded");
    }

    #[test]
    fn test_message_serializes_with_role_tag() {
        let msg: Message = ToolCallResult::success("call_1", "3 passages found").into();
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_1");
        assert_eq!(value["content"], "3 passages found");
    }

    #[test]
    fn test_assistant_terminal_detection() {
        assert!(AssistantMessage::text("done").is_terminal());
        assert!(AssistantMessage::default().is_terminal());
        assert!(!AssistantMessage::with_tool_calls(vec![ToolCallRequest::new(
            "a",
            "b",
            json!({})
        )])
        .is_terminal());
    }

    #[test]
    fn test_catalog_clone_shares_tools() {
        let catalog = ToolCatalog::new(vec![ToolDefinition::new(
            "search",
            "Search the corpus",
            json!({"type": "object"}),
        )]);
        let clone = catalog.clone();
        assert!(catalog.ptr_eq(&clone));
        assert_eq!(clone.get("search").map(|t| t.name.as_str()), Some("search"));
        assert!(clone.get("missing").is_none());
        assert_eq!(catalog.names(), vec!["search"]);
    }

    #[test]
    fn test_tool_definition_defaults_parameters() {
        let def: ToolDefinition = serde_json::from_value(json!({"name": "ping"})).unwrap();
        assert_eq!(def.parameters["type"], "object");
        assert!(def.description.is_none());
        assert!(def.extra.is_empty());
    }

    #[test]
    fn test_tool_definition_keeps_extra_fields() {
        let def: ToolDefinition = serde_json::from_value(json!({
            "name": "search",
            "parameters": {"type": "object"},
            "strict": true
        }))
        .unwrap();
        assert_eq!(def.extra.get("strict"), Some(&json!(true)));

        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["strict"], true);
        assert_eq!(value["name"], "search");
    }
}
