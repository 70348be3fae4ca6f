//! Retriever trait — the semantic-similarity knowledge lookup collaborator.
//!
//! Maps a query to ranked knowledge-base snippets. The embedding model,
//! vector index, and relational schema behind it are out of scope; the
//! dispatcher treats a retrieval failure as "no context", never as fatal.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;
use crate::lang::{Complexity, Language};

/// A ranked knowledge snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    /// Similarity score, higher is more relevant.
    pub score: f32,

    /// The snippet text, already truncated by the retriever.
    pub text: String,
}

/// The retrieval collaborator.
///
/// Language and complexity let the backend tune its record count,
/// truncation limits, and similarity threshold per query.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve ranked snippets for a (preprocessed) query.
    async fn retrieve(
        &self,
        query: &str,
        language: Language,
        complexity: Complexity,
    ) -> std::result::Result<Vec<Snippet>, RetrievalError>;
}
