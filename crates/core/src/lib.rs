//! # Zanko Core
//!
//! Domain types, traits, and error definitions for the zanko chatbot
//! orchestration layer. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators (the generative-text provider and the
//! knowledge retriever) are defined as traits here. Concrete implementations
//! live outside this workspace; tests use mocks. This enables:
//! - Swapping providers via configuration
//! - Easy testing with stub collaborators
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod lang;
pub mod message;
pub mod provider;
pub mod retrieval;

// Re-export key types at crate root for ergonomics
pub use error::{ChatError, ProviderError, Result, RetrievalError};
pub use lang::{Complexity, Language};
pub use message::{Message, Role, SessionId};
pub use provider::{CompletionRequest, Provider};
pub use retrieval::{Retriever, Snippet};
