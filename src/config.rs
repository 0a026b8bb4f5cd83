//! Process configuration
//!
//! Everything the agent needs from the outside world: endpoints, model,
//! round bound, timeouts, and the prompt/task pair. Values come from the
//! environment with local-development defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::agent::{DEFAULT_TASK, SYSTEM_PROMPT};
use crate::error::ConfigError;

pub const DEFAULT_CHAT_BASE_URL: &str = "http://localhost:11434/v1";
pub const DEFAULT_CHAT_API_KEY: &str = "ollama";
pub const DEFAULT_MODEL: &str = "qwen2.5:7b";
pub const DEFAULT_TOOL_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_MAX_ROUNDS: usize = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Configuration for one agent process
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub chat_base_url: String,
    pub chat_api_key: String,
    pub model: String,
    pub tool_base_url: String,
    pub max_rounds: usize,
    pub request_timeout: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub system_prompt: String,
    pub task: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            chat_base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            chat_api_key: DEFAULT_CHAT_API_KEY.to_string(),
            model: DEFAULT_MODEL.to_string(),
            tool_base_url: DEFAULT_TOOL_BASE_URL.to_string(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            temperature: None,
            max_tokens: None,
            system_prompt: SYSTEM_PROMPT.to_string(),
            task: DEFAULT_TASK.to_string(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from the process environment
    ///
    /// Reads:
    /// - `AGENT_CHAT_BASE_URL`, `AGENT_CHAT_API_KEY`, `AGENT_MODEL`
    /// - `AGENT_TOOL_BASE_URL`
    /// - `AGENT_MAX_ROUNDS`, `AGENT_REQUEST_TIMEOUT_SECS`
    /// - `AGENT_TEMPERATURE`, `AGENT_MAX_TOKENS` (optional)
    /// - `AGENT_SYSTEM_PROMPT`, `AGENT_TASK`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_rounds = parse_or(&get, "AGENT_MAX_ROUNDS", defaults.max_rounds)?;
        if max_rounds == 0 {
            return Err(invalid("AGENT_MAX_ROUNDS", "0", "must be at least 1"));
        }

        let timeout_secs = parse_or(
            &get,
            "AGENT_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            chat_base_url: get("AGENT_CHAT_BASE_URL").unwrap_or(defaults.chat_base_url),
            chat_api_key: get("AGENT_CHAT_API_KEY").unwrap_or(defaults.chat_api_key),
            model: get("AGENT_MODEL").unwrap_or(defaults.model),
            tool_base_url: get("AGENT_TOOL_BASE_URL").unwrap_or(defaults.tool_base_url),
            max_rounds,
            request_timeout: Duration::from_secs(timeout_secs),
            temperature: parse_opt(&get, "AGENT_TEMPERATURE")?,
            max_tokens: parse_opt(&get, "AGENT_MAX_TOKENS")?,
            system_prompt: get("AGENT_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
            task: get("AGENT_TASK").unwrap_or(defaults.task),
        })
    }

    /// Set the user task
    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_opt(get, key)?.unwrap_or(default))
}

fn parse_opt<F, T>(get: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| invalid(key, &raw, &e.to_string())),
        None => Ok(None),
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
