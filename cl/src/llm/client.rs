//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent (fresh context)
///
/// Each completion request is independent; no conversation state is kept
/// between calls. Every step of the idea chain is a fresh request whose only
/// memory of earlier steps is the idea text threaded into its prompt.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (waits until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
