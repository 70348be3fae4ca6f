//! Conversation-context extraction for follow-up questions.
//!
//! Derives a compact textual summary of the session history to embed in
//! the system prompt. Deterministic and order-preserving: messages appear
//! in their original order, truncated to per-message character budgets,
//! and never more than two exchanges are included.

use zanko_core::lang::Language;
use zanko_core::message::{Message, Role};

use crate::classifier::is_followup;

/// Character budget per message of the immediately preceding exchange.
const RECENT_CHAR_BUDGET: usize = 300;

/// Character budget per message of the exchange before that.
const EARLIER_CHAR_BUDGET: usize = 200;

/// Extracts conversation context from session history.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextExtractor;

impl ContextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Build the context summary for `current_query` from `history`.
    ///
    /// Always includes the immediately preceding user/assistant exchange.
    /// When the query is a follow-up and at least four messages exist, the
    /// exchange two positions further back is included as well, under a
    /// smaller budget. Returns an empty string for histories shorter than
    /// two messages.
    pub fn extract(&self, history: &[Message], current_query: &str, language: Language) -> String {
        if history.len() < 2 {
            return String::new();
        }

        let mut parts: Vec<String> = Vec::new();

        if is_followup(current_query, language) && history.len() >= 4 {
            for msg in &history[history.len() - 4..history.len() - 2] {
                let label = match msg.role {
                    Role::User => "Earlier question",
                    Role::Assistant => "Earlier answer",
                };
                parts.push(format!(
                    "{label}: {}",
                    truncate_chars(&msg.content, EARLIER_CHAR_BUDGET)
                ));
            }
        }

        let last_user = &history[history.len() - 2];
        let last_assistant = &history[history.len() - 1];
        if last_user.role == Role::User && last_assistant.role == Role::Assistant {
            parts.push(format!(
                "Previous question: {}",
                truncate_chars(&last_user.content, RECENT_CHAR_BUDGET)
            ));
            parts.push(format!(
                "Previous answer: {}",
                truncate_chars(&last_assistant.content, RECENT_CHAR_BUDGET)
            ));
        }

        parts.join("\n")
    }
}

/// First `max` characters of `s` with an ellipsis when truncated. Never
/// splits inside a code point.
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
