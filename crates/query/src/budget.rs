//! Token budget planning — output ceilings, temperature, and prompt-size
//! safety valves.
//!
//! Token estimation is heuristic. Latin text averages ~4 characters per
//! token; Arabic-script Kurdish tokenizes far less predictably, so its
//! estimate takes the larger of a word-based and a character-based bound
//! and the planner adds a further 20% safety margin.

use zanko_core::lang::{Complexity, Language};
use zanko_core::message::Message;

/// Output ceiling floor when a large prompt squeezes the budget.
const MIN_OUTPUT_TOKENS: u32 = 100;

/// Prompt share of the budget above which the output ceiling shrinks.
const SHRINK_THRESHOLD: f32 = 0.7;

/// Prompt share of the budget above which history is dropped entirely.
const TRUNCATE_THRESHOLD: f32 = 0.8;

/// Output-token ceiling and sampling temperature for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenLimits {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// The planner's decision for a request: the final output ceiling and the
/// message history actually sent to the provider.
#[derive(Debug, Clone)]
pub struct BudgetPlan {
    pub max_tokens: u32,
    pub messages: Vec<Message>,
    pub estimated_prompt_tokens: u32,
}

/// Fixed lookup of limits per (complexity, language).
///
/// Temperature rises strictly with complexity and is language-independent.
/// Simple Kurdish answers get a slightly higher ceiling than English ones
/// because the script spends more tokens per word.
pub fn limits(language: Language, complexity: Complexity) -> TokenLimits {
    let max_tokens = match (complexity, language) {
        (Complexity::Simple, Language::English) => 150,
        (Complexity::Simple, Language::Kurdish) => 200,
        (Complexity::Medium, _) => 1000,
        (Complexity::Detailed, _) => 1100,
    };
    let temperature = match complexity {
        Complexity::Simple => 0.1,
        Complexity::Medium => 0.3,
        Complexity::Detailed => 0.4,
    };
    TokenLimits {
        max_tokens,
        temperature,
    }
}

/// Estimate the token count of a text for a given language.
///
/// Latin: characters / 4. Kurdish: max(words × 5, characters × 2/3) — the
/// word-based figure is a safer lower bound for agglutinative Sorani.
pub fn estimate_tokens(text: &str, language: Language) -> u32 {
    let chars = text.chars().count() as u32;
    match language {
        Language::English => chars / 4,
        Language::Kurdish => {
            let words = text.split_whitespace().count() as u32;
            (words * 5).max(chars * 2 / 3)
        }
    }
}

/// Plans prompt budgets against a fixed total token budget.
#[derive(Debug, Clone, Copy)]
pub struct BudgetPlanner {
    total_budget: u32,
}

impl BudgetPlanner {
    pub fn new(total_budget: u32) -> Self {
        Self { total_budget }
    }

    /// Decide the output ceiling and provider-bound history for a request.
    ///
    /// The estimate covers the system prompt plus all candidate messages,
    /// with a 20% margin for Kurdish. Above 70% of the budget the output
    /// ceiling shrinks to what remains (floored at 100); above 80% the
    /// history collapses to just the current query — conversation context
    /// is sacrificed before output quality.
    pub fn plan(
        &self,
        system_prompt: &str,
        messages: Vec<Message>,
        language: Language,
        complexity: Complexity,
    ) -> BudgetPlan {
        let mut full_prompt = String::from(system_prompt);
        for msg in &messages {
            full_prompt.push(' ');
            full_prompt.push_str(&msg.content);
        }

        let mut estimate = estimate_tokens(&full_prompt, language);
        if language == Language::Kurdish {
            estimate = estimate * 12 / 10;
        }

        let mut max_tokens = limits(language, complexity).max_tokens;
        let mut messages = messages;
        let budget = self.total_budget as f32;

        if estimate as f32 > budget * SHRINK_THRESHOLD {
            max_tokens = self
                .total_budget
                .saturating_sub(estimate)
                .max(MIN_OUTPUT_TOKENS);
            tracing::warn!(
                estimated_prompt_tokens = estimate,
                max_output_tokens = max_tokens,
                "Large prompt, reducing output ceiling"
            );

            if estimate as f32 > budget * TRUNCATE_THRESHOLD {
                if let Some(current) = messages.pop() {
                    messages = vec![current];
                }
                tracing::warn!("Dropped conversation history to fit token budget");
            }
        }

        BudgetPlan {
            max_tokens,
            messages,
            estimated_prompt_tokens: estimate,
        }
    }
}
