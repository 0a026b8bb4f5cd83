//! Tool service trait definition
//!
//! Tools live behind an external service. The agent only discovers them and
//! asks for them to be run; it never implements a tool itself.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;
use crate::llm::ToolCatalog;

/// A service that lists and executes tools
///
/// The service is identifier-agnostic: it receives a tool name and its
/// arguments and returns the result text. Correlating results with call ids
/// is the agent loop's job.
#[async_trait]
pub trait ToolService: Send + Sync {
    /// Fetch the catalog of available tools
    async fn list_tools(&self) -> Result<ToolCatalog, ToolError>;

    /// Execute a tool with already-validated arguments
    async fn call(&self, name: &str, arguments: &Value) -> Result<String, ToolError>;
}
