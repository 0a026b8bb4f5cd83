pub mod agent_loop;
pub mod system_prompt;

pub use agent_loop::{AgentLoop, LoopConfig, LoopState, RunOutcome, RunReport};
pub use system_prompt::{DEFAULT_TASK, SYSTEM_PROMPT};
