//! Chat service abstraction
//!
//! The agent loop only needs one operation from the model: given the
//! transcript so far and the tool catalog, produce the next assistant
//! message. Anything that can do that implements [`ChatService`].

use async_trait::async_trait;

use super::types::{AssistantMessage, ToolCatalog, Transcript};
use crate::error::ChatError;

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Produce exactly one assistant message for the given transcript
    async fn complete(
        &self,
        transcript: &Transcript,
        catalog: &ToolCatalog,
    ) -> Result<AssistantMessage, ChatError>;

    /// Model identifier used for completions
    fn model(&self) -> &str;

    /// Short provider name for logs
    fn provider_name(&self) -> &str;
}
