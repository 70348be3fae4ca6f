//! Query analysis for the zanko orchestration core.
//!
//! Three deterministic, side-effect-free stages that shape every request
//! before it reaches a provider:
//!
//! - [`classifier`] — language detection, complexity tiers, follow-up
//!   detection, and query preprocessing
//! - [`context`] — compact conversation-context extraction from session
//!   history
//! - [`budget`] — token/temperature limits and prompt-size planning
//!
//! All pattern sets exist in two full, independent versions: Sorani
//! Kurdish (Arabic script) and English (Latin script). A query is matched
//! only against the set of its detected language — no transliteration.

pub mod budget;
pub mod classifier;
pub mod context;

pub use budget::{BudgetPlan, BudgetPlanner, TokenLimits};
pub use classifier::{classify_complexity, detect_language, is_followup, preprocess_query};
pub use context::ContextExtractor;
