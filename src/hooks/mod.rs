//! Hooks Module
//!
//! Observe agent behavior at key execution points.
//!
//! # Example
//!
//! ```ignore
//! use tool_agent::hooks::{HookEvent, HookRegistry};
//!
//! let mut hooks = HookRegistry::new();
//!
//! hooks.add(HookEvent::PreToolCall, |ctx| {
//!     if let Some(call) = ctx.tool_call {
//!         tracing::info!("calling {} ({})", call.name, call.id);
//!     }
//! });
//!
//! let agent = AgentLoop::new(chat, tools, LoopConfig::default()).with_hooks(hooks);
//! ```
//!
//! # Hook Events
//!
//! | Event | When | Context fields |
//! |-------|------|----------------|
//! | `RoundStart` | Before each chat-service call | `round` |
//! | `AssistantResponse` | After the assistant message is appended | `round`, `assistant` |
//! | `PreToolCall` | Before a tool call is resolved and executed | `round`, `tool_call` |
//! | `PostToolCall` | After its result (or folded failure) is appended | `round`, `tool_call`, `tool_result` |
//! | `Completed` | The model produced a final answer | `round`, `answer` |
//! | `Exhausted` | The round budget ran out | `round` |
//!
//! Hooks run synchronously, in registration order, and cannot alter the
//! loop. Every hook registered for an event runs.

use std::fmt;
use std::sync::Arc;

use crate::llm::{AssistantMessage, ToolCallRequest, ToolCallResult};

/// Points in the loop where hooks fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    RoundStart,
    AssistantResponse,
    PreToolCall,
    PostToolCall,
    Completed,
    Exhausted,
}

/// Data available to a hook
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub event: HookEvent,
    /// Run identifier
    pub run_id: &'a str,
    /// 1-based round number
    pub round: usize,
    pub assistant: Option<&'a AssistantMessage>,
    pub tool_call: Option<&'a ToolCallRequest>,
    pub tool_result: Option<&'a ToolCallResult>,
    pub answer: Option<&'a str>,
}

impl<'a> HookContext<'a> {
    pub fn new(event: HookEvent, run_id: &'a str, round: usize) -> Self {
        Self {
            event,
            run_id,
            round,
            assistant: None,
            tool_call: None,
            tool_result: None,
            answer: None,
        }
    }

    pub fn with_assistant(mut self, assistant: &'a AssistantMessage) -> Self {
        self.assistant = Some(assistant);
        self
    }

    pub fn with_tool_call(mut self, call: &'a ToolCallRequest) -> Self {
        self.tool_call = Some(call);
        self
    }

    pub fn with_tool_result(mut self, result: &'a ToolCallResult) -> Self {
        self.tool_result = Some(result);
        self
    }

    pub fn with_answer(mut self, answer: &'a str) -> Self {
        self.answer = Some(answer);
        self
    }
}

/// A registered hook callback
pub type ArcHook = Arc<dyn Fn(&HookContext<'_>) + Send + Sync>;

/// Collection of hooks keyed by event
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Vec<(HookEvent, ArcHook)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook for one event
    pub fn add<F>(&mut self, event: HookEvent, hook: F) -> &mut Self
    where
        F: Fn(&HookContext<'_>) + Send + Sync + 'static,
    {
        self.hooks.push((event, Arc::new(hook)));
        self
    }

    /// Register the same hook for several events
    pub fn add_for<F>(&mut self, events: &[HookEvent], hook: F) -> &mut Self
    where
        F: Fn(&HookContext<'_>) + Send + Sync + 'static,
    {
        let hook: ArcHook = Arc::new(hook);
        for event in events {
            self.hooks.push((*event, hook.clone()));
        }
        self
    }

    /// Run every hook registered for `ctx.event`
    pub fn fire(&self, ctx: &HookContext<'_>) {
        for (event, hook) in &self.hooks {
            if *event == ctx.event {
                hook(ctx);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.hooks.iter().map(|(e, _)| *e).collect::<Vec<_>>())
            .finish()
    }
}
