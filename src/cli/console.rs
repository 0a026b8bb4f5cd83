use colored::*;
use serde_json::Value;

use crate::hooks::{HookEvent, HookRegistry};

/// Maximum characters of a tool result shown on the console
const MAX_RESULT_PREVIEW: usize = 300;

/// Console handles all terminal output with colored formatting
#[derive(Debug, Clone, Copy)]
pub struct Console {
    assistant_color: Color,
    tool_color: Color,
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            assistant_color: Color::Green,
            tool_color: Color::Magenta,
        }
    }

    /// Print the final answer
    pub fn print_assistant(&self, message: &str) {
        println!(
            "{} {}",
            "Assistant:".color(self.assistant_color).bold(),
            message.color(self.assistant_color)
        );
    }

    /// Print intermediate assistant text that came with tool calls
    pub fn print_thinking(&self, message: &str) {
        println!("{} {}", "Assistant:".bright_black().bold(), message.bright_black());
    }

    /// Print a tool invocation
    pub fn print_tool_call(&self, name: &str, arguments: &Value) {
        eprintln!(
            "{} {} {}",
            "Tool:".color(self.tool_color).bold(),
            name.color(self.tool_color),
            arguments.to_string().bright_black()
        );
    }

    /// Print a tool result, truncated for display
    pub fn print_tool_result(&self, output: &str, is_error: bool) {
        let preview = truncate(output, MAX_RESULT_PREVIEW);
        if is_error {
            eprintln!("  {} {}", "✗".red().bold(), preview.red());
        } else {
            eprintln!("  {} {}", "✓".green().bold(), preview);
        }
    }

    /// Print a system message (status, info, etc.)
    pub fn print_system(&self, message: &str) {
        eprintln!("{} {}", "System:".yellow().bold(), message);
    }

    /// Print an error message
    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }

    /// Print a separator line
    pub fn print_separator(&self) {
        eprintln!("{}", "-".repeat(60).bright_black());
    }

    /// Register hooks that render loop progress on this console
    pub fn progress_hooks(&self) -> HookRegistry {
        let mut hooks = HookRegistry::new();

        let console = *self;
        hooks.add(HookEvent::RoundStart, move |ctx| {
            console.print_system(&format!("Round {}", ctx.round));
        });
        hooks.add(HookEvent::AssistantResponse, move |ctx| {
            if let Some(assistant) = ctx.assistant {
                match &assistant.content {
                    Some(text) if !assistant.is_terminal() => console.print_thinking(text),
                    _ => {}
                }
            }
        });
        hooks.add(HookEvent::PreToolCall, move |ctx| {
            if let Some(call) = ctx.tool_call {
                console.print_tool_call(&call.name, &call.arguments);
            }
        });
        hooks.add(HookEvent::PostToolCall, move |ctx| {
            if let Some(result) = ctx.tool_result {
                console.print_tool_result(&result.content, result.is_error);
            }
        });

        hooks
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
