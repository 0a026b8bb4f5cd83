//! Error types for the agent loop and its collaborators

use thiserror::Error;

/// Failure talking to the chat service. Always fatal to a run.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed chat response: {0}")]
    Malformed(String),
}

/// Failure resolving or executing a tool call.
///
/// Only transport-level failures abort a run; the rest are reported back to
/// the model as tool results.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed tool service response: {0}")]
    Malformed(String),

    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("tool '{tool}' failed: {message}")]
    Execution { tool: String, message: String },
}

impl ToolError {
    /// Whether this failure must abort the run instead of being folded into
    /// the transcript
    pub fn is_fatal(&self) -> bool {
        matches!(self, ToolError::Transport(_) | ToolError::Malformed(_))
    }
}

/// Failure of a whole run
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid run input: {0}")]
    InvalidInput(String),

    #[error("failed to fetch tool catalog: {0}")]
    Discovery(#[source] ToolError),

    #[error("chat service failed in round {round}: {source}")]
    Chat {
        round: usize,
        #[source]
        source: ChatError,
    },

    #[error("tool service failed in round {round}: {source}")]
    ToolService {
        round: usize,
        #[source]
        source: ToolError,
    },
}

/// Invalid configuration value
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

pub type AgentResult<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_fatality() {
        assert!(ToolError::Malformed("no result".into()).is_fatal());
        assert!(!ToolError::UnknownTool("nope".into()).is_fatal());
        assert!(!ToolError::Execution {
            tool: "search".into(),
            message: "boom".into()
        }
        .is_fatal());
        assert!(!ToolError::InvalidArguments {
            tool: "search".into(),
            reason: "missing query".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_agent_error_display_includes_round() {
        let err = AgentError::Chat {
            round: 3,
            source: ChatError::Malformed("no choices".into()),
        };
        assert_eq!(
            err.to_string(),
            "chat service failed in round 3: malformed chat response: no choices"
        );
    }
}
