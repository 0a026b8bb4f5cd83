//! Agent loop with tool calling support
//!
//! One run is a bounded exchange:
//! - Ask the chat service for the next assistant message
//! - If it requests tools, execute them in order and append the results
//! - Stop on a message without tool calls, or when the round budget is spent
//!
//! Tool failures (unknown tool, bad arguments, tool-side errors) are folded
//! back into the transcript so the model can react. Transport failures of
//! either service abort the run.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::{AgentConfig, DEFAULT_MAX_ROUNDS};
use crate::error::{AgentError, AgentResult, ToolError};
use crate::hooks::{HookContext, HookEvent, HookRegistry};
use crate::llm::{ChatService, ToolCallRequest, ToolCallResult, ToolCatalog, Transcript};
use crate::tools::{validate_arguments, ToolService};

/// Loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Maximum number of chat-service calls in one run
    pub max_rounds: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl From<&AgentConfig> for LoopConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            max_rounds: config.max_rounds,
        }
    }
}

/// Controller state
#[derive(Debug, Clone, PartialEq)]
pub enum LoopState {
    /// Waiting for the chat service to answer round `round`
    AwaitingModel { round: usize },
    /// Executing the tool calls requested in round `round`
    AwaitingTools {
        round: usize,
        calls: Vec<ToolCallRequest>,
    },
    /// The model produced a final answer in round `rounds`
    Completed { answer: String, rounds: usize },
    /// The budget ran out before a final answer
    Exhausted { rounds: usize },
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Completed { .. } | LoopState::Exhausted { .. })
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { answer: String, rounds: usize },
    Exhausted { rounds: usize },
}

impl RunOutcome {
    /// The final answer, if the run completed
    pub fn answer(&self) -> Option<&str> {
        match self {
            RunOutcome::Completed { answer, .. } => Some(answer),
            RunOutcome::Exhausted { .. } => None,
        }
    }

    /// Number of chat-service rounds used
    pub fn rounds(&self) -> usize {
        match self {
            RunOutcome::Completed { rounds, .. } | RunOutcome::Exhausted { rounds } => *rounds,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RunOutcome::Exhausted { .. })
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub transcript: Transcript,
    /// Tool calls handled, including folded failures
    pub tool_calls: usize,
}

/// Drives the chat/tool exchange for one task at a time.
///
/// `run` takes `&self`, so one controller can serve concurrent runs; each
/// run owns its transcript and shares only the read-only catalog.
pub struct AgentLoop {
    chat: Arc<dyn ChatService>,
    tools: Arc<dyn ToolService>,
    config: LoopConfig,
    hooks: HookRegistry,
}

impl AgentLoop {
    pub fn new(chat: Arc<dyn ChatService>, tools: Arc<dyn ToolService>, config: LoopConfig) -> Self {
        tracing::info!(
            "Creating agent loop (provider: {}, model: {}, max rounds: {})",
            chat.provider_name(),
            chat.model(),
            config.max_rounds
        );
        Self {
            chat,
            tools,
            config,
            hooks: HookRegistry::new(),
        }
    }

    /// Attach hooks that observe the loop
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Fetch the tool catalog once, then run the task against it
    pub async fn run_with_discovery(
        &self,
        system_prompt: &str,
        user_task: &str,
    ) -> AgentResult<RunReport> {
        let catalog = self.tools.list_tools().await.map_err(|e| {
            tracing::error!("Failed to fetch tool catalog: {}", e);
            AgentError::Discovery(e)
        })?;
        self.run(system_prompt, user_task, &catalog).await
    }

    /// Run one task to completion or exhaustion
    pub async fn run(
        &self,
        system_prompt: &str,
        user_task: &str,
        catalog: &ToolCatalog,
    ) -> AgentResult<RunReport> {
        validate_input(system_prompt, user_task, self.config.max_rounds)?;

        let run_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let max_rounds = self.config.max_rounds;

        tracing::info!(
            "Starting run {} with {} tools, max {} rounds",
            run_id,
            catalog.len(),
            max_rounds
        );

        let mut transcript = Transcript::new(system_prompt, user_task);
        let mut tool_calls = 0;
        let mut state = LoopState::AwaitingModel { round: 1 };

        let final_state = loop {
            if state.is_terminal() {
                break state;
            }
            state = match state {
                LoopState::AwaitingModel { round } if round > max_rounds => {
                    LoopState::Exhausted { rounds: max_rounds }
                }
                LoopState::AwaitingModel { round } => {
                    self.hooks
                        .fire(&HookContext::new(HookEvent::RoundStart, &run_id, round));
                    tracing::info!("Run {}: round {}/{}", run_id, round, max_rounds);

                    let assistant = self
                        .chat
                        .complete(&transcript, catalog)
                        .await
                        .map_err(|source| {
                            tracing::error!("Run {}: chat service failed: {}", run_id, source);
                            AgentError::Chat { round, source }
                        })?;

                    transcript.push(assistant.clone());
                    self.hooks.fire(
                        &HookContext::new(HookEvent::AssistantResponse, &run_id, round)
                            .with_assistant(&assistant),
                    );

                    if assistant.is_terminal() {
                        LoopState::Completed {
                            answer: assistant.content.unwrap_or_default(),
                            rounds: round,
                        }
                    } else {
                        tracing::info!(
                            "Run {}: model requested {} tool call(s)",
                            run_id,
                            assistant.tool_calls.len()
                        );
                        LoopState::AwaitingTools {
                            round,
                            calls: assistant.tool_calls,
                        }
                    }
                }
                LoopState::AwaitingTools { round, calls } => {
                    for call in &calls {
                        let result = self.execute_tool_call(&run_id, round, call, catalog).await?;
                        transcript.push(result);
                        tool_calls += 1;
                    }
                    LoopState::AwaitingModel { round: round + 1 }
                }
                terminal => terminal,
            };
        };

        let outcome = match final_state {
            LoopState::Completed { answer, rounds } => {
                tracing::info!("Run {} completed after {} round(s)", run_id, rounds);
                self.hooks.fire(
                    &HookContext::new(HookEvent::Completed, &run_id, rounds).with_answer(&answer),
                );
                RunOutcome::Completed { answer, rounds }
            }
            _ => {
                tracing::warn!(
                    "Run {} exhausted {} rounds without a final answer",
                    run_id,
                    max_rounds
                );
                self.hooks
                    .fire(&HookContext::new(HookEvent::Exhausted, &run_id, max_rounds));
                RunOutcome::Exhausted { rounds: max_rounds }
            }
        };

        Ok(RunReport {
            run_id,
            started_at,
            outcome,
            transcript,
            tool_calls,
        })
    }

    /// Resolve, validate and execute one tool call, folding recoverable
    /// failures into an error result
    async fn execute_tool_call(
        &self,
        run_id: &str,
        round: usize,
        call: &ToolCallRequest,
        catalog: &ToolCatalog,
    ) -> AgentResult<ToolCallResult> {
        self.hooks.fire(
            &HookContext::new(HookEvent::PreToolCall, run_id, round).with_tool_call(call),
        );
        tracing::info!("Tool call requested: {} ({})", call.name, call.id);

        let result = match self.invoke(call, catalog).await {
            Ok(output) => ToolCallResult::success(&call.id, output),
            Err(e) if e.is_fatal() => {
                tracing::error!("Tool service failed on {} ({}): {}", call.name, call.id, e);
                return Err(AgentError::ToolService { round, source: e });
            }
            Err(e) => {
                tracing::warn!("Tool call {} ({}) failed: {}", call.name, call.id, e);
                ToolCallResult::error(&call.id, &e)
            }
        };

        self.hooks.fire(
            &HookContext::new(HookEvent::PostToolCall, run_id, round)
                .with_tool_call(call)
                .with_tool_result(&result),
        );
        Ok(result)
    }

    async fn invoke(&self, call: &ToolCallRequest, catalog: &ToolCatalog) -> Result<String, ToolError> {
        let tool = catalog
            .get(&call.name)
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;

        validate_arguments(tool, &call.arguments).map_err(|reason| ToolError::InvalidArguments {
            tool: call.name.clone(),
            reason,
        })?;

        self.tools.call(&call.name, &call.arguments).await
    }
}

fn validate_input(system_prompt: &str, user_task: &str, max_rounds: usize) -> AgentResult<()> {
    if system_prompt.trim().is_empty() {
        return Err(AgentError::InvalidInput("system prompt is empty".to_string()));
    }
    if user_task.trim().is_empty() {
        return Err(AgentError::InvalidInput("user task is empty".to_string()));
    }
    if max_rounds == 0 {
        return Err(AgentError::InvalidInput(
            "max rounds must be at least 1".to_string(),
        ));
    }
    Ok(())
}
