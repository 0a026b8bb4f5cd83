pub mod openai;
pub mod provider;
pub mod types;

pub use openai::OpenAiChatService;
pub use provider::ChatService;
pub use types::{
    AssistantMessage, Message, ToolCallRequest, ToolCallResult, ToolCatalog, ToolDefinition,
    Transcript,
};
