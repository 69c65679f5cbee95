use crate::Result;
use arena_types::{Cost, Message, Params, TokenUsage};
use async_trait::async_trait;

/// Uniform capability to produce an assistant message from a message
/// history, with optional tool calls (spec §2, C1).
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier, e.g. `"mock"`, `"anthropic"`, `"openai"`.
    fn name(&self) -> &str;

    /// Generate the next assistant message given the conversation so far.
    async fn complete(&self, history: &[Message], params: &Params) -> Result<Message>;

    /// Price a token usage figure for this provider. Mock and free
    /// providers return `Cost::default()`.
    fn cost(&self, usage: TokenUsage) -> Cost {
        let _ = usage;
        Cost::default()
    }
}
