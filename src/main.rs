//! Run a single research task against the configured chat and tool services.
//!
//! Run with:
//!   cargo run                                   # default task
//!   cargo run -- "Find pastoral passages"       # custom task
//!
//! Exit status: 0 with a final answer, 2 when the round budget ran out,
//! 1 on a fatal error.

use anyhow::{Context, Result};
use std::process::ExitCode;
use std::sync::Arc;

use tool_agent::cli::Console;
use tool_agent::logging::init_logging;
use tool_agent::{
    AgentConfig, AgentLoop, HttpToolService, LoopConfig, OpenAiChatService, RunOutcome,
};

const EXIT_EXHAUSTED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging()?;

    let mut config = AgentConfig::from_env().context("Invalid configuration")?;
    if let Some(task) = std::env::args().nth(1) {
        config = config.with_task(task);
    }

    let console = Console::new();

    let chat = OpenAiChatService::from_config(&config).context("Failed to create chat client")?;
    let tools = HttpToolService::from_config(&config).context("Failed to create tool client")?;

    let agent = AgentLoop::new(Arc::new(chat), Arc::new(tools), LoopConfig::from(&config))
        .with_hooks(console.progress_hooks());

    let report = match agent
        .run_with_discovery(&config.system_prompt, &config.task)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Run failed: {:?}", e);
            console.print_error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };

    console.print_separator();
    match report.outcome {
        RunOutcome::Completed { answer, rounds } => {
            tracing::info!("Final answer after {} round(s), {} tool call(s)", rounds, report.tool_calls);
            console.print_assistant(&answer);
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Exhausted { rounds } => {
            console.print_system(&format!(
                "Incomplete: no final answer after {} rounds ({} tool calls)",
                rounds, report.tool_calls
            ));
            Ok(ExitCode::from(EXIT_EXHAUSTED))
        }
    }
}
