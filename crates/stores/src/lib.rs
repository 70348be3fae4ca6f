//! Process-wide shared stores for the zanko orchestration core.
//!
//! Four stores with lifecycle = process lifetime, exclusively owned by the
//! dispatcher and injected into it at construction (no hidden globals —
//! tests get fresh instances):
//!
//! - [`RateLimiter`] — per-client fixed-window request counters
//! - [`SessionStore`] — bounded, idle-expiring conversation histories
//! - [`ResponseCache`] — content+context addressed answer cache (FIFO bounded)
//! - [`EmbeddingCache`] — text→vector cache (LRU bounded)
//!
//! All locking is brief and synchronous; no lock is ever held across an
//! `.await`. A concurrent reader observes either the pre- or post-write
//! value of a key, never a torn one.

pub mod embedding_cache;
pub mod rate_limiter;
pub mod response_cache;
pub mod session;

pub use embedding_cache::EmbeddingCache;
pub use rate_limiter::RateLimiter;
pub use response_cache::{cache_key, ResponseCache};
pub use session::{SessionHistory, SessionStore};
