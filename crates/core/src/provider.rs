//! Provider trait — the abstraction over generative-text backends.
//!
//! The dispatcher calls `complete()` without knowing which provider is
//! behind it. Concrete HTTP clients live outside this workspace; the
//! engine only needs the capability "complete(prompt, config) -> text,
//! fails with ProviderError".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// A fully-assembled completion request.
///
/// Everything the budget planner decided is already applied: `messages` is
/// the (possibly truncated) history plus the current query, and
/// `max_tokens` is the adjusted output ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System prompt including knowledge and conversation context sections.
    pub system_prompt: String,

    /// The conversation messages, oldest first, current query last.
    pub messages: Vec<Message>,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Temperature (strictly increasing with query complexity).
    pub temperature: f32,
}

/// The generative-text provider collaborator.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "claude", "openai").
    fn name(&self) -> &str;

    /// Send a request and get the generated answer text.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_serialization() {
        let req = CompletionRequest {
            system_prompt: "You are a university assistant.".into(),
            messages: vec![Message::user("hello")],
            max_tokens: 150,
            temperature: 0.1,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("university assistant"));
        assert!(json.contains("\"max_tokens\":150"));
    }
}
