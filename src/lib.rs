//! Bounded agentic tool-calling loop
//!
//! Connects an OpenAI-compatible chat endpoint to an external tool service:
//! the model calls tools, sees their results, and keeps going until it gives
//! a final answer or the round budget runs out.
//!
//! ```ignore
//! let config = AgentConfig::from_env()?;
//! let chat = Arc::new(OpenAiChatService::from_config(&config)?);
//! let tools = Arc::new(HttpToolService::from_config(&config)?);
//!
//! let agent = AgentLoop::new(chat, tools, LoopConfig::from(&config));
//! let report = agent.run_with_discovery(&config.system_prompt, &config.task).await?;
//!
//! match report.outcome {
//!     RunOutcome::Completed { answer, .. } => println!("{}", answer),
//!     RunOutcome::Exhausted { rounds } => eprintln!("no answer after {} rounds", rounds),
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod hooks;
pub mod llm;
pub mod logging;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use agent::{AgentLoop, LoopConfig, LoopState, RunOutcome, RunReport};
pub use config::AgentConfig;
pub use error::{AgentError, AgentResult, ChatError, ConfigError, ToolError};
pub use llm::{
    AssistantMessage, ChatService, Message, OpenAiChatService, ToolCallRequest, ToolCallResult,
    ToolCatalog, ToolDefinition, Transcript,
};
pub use tools::{HttpToolService, ToolService};
