//! Default prompt and task for the corpus research agent

/// The default system prompt for the research agent
pub const SYSTEM_PROMPT: &str = "You are a musicology research assistant. \
Use the available tools to analyse the corpus. \
When you find a relevant passage, write an annotation with a concise tag.";

/// The default task given as the user message
pub const DEFAULT_TASK: &str = "Search the corpus for uses of the word 'sublime' \
and annotate the three most significant passages.";
