//! Embedding cache — bounded text→vector lookups with LRU eviction.
//!
//! The retrieval collaborator embeds both queries and knowledge-base rows;
//! the same texts recur constantly, and an embedding call is the most
//! expensive part of retrieval after the model call itself. The core owns
//! this cache and its eviction policy; the retriever only gets a shared
//! handle.

use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Bounded LRU cache of embedding vectors keyed by a digest of the text.
#[derive(Debug)]
pub struct EmbeddingCache {
    inner: Mutex<LruCache<String, Vec<f32>>>,
}

impl EmbeddingCache {
    /// Create a cache holding at most `capacity` vectors.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up the embedding for a text, marking it recently used.
    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.get(&digest(text)).cloned()
    }

    /// Store the embedding for a text, evicting the least recently used
    /// entry if full.
    pub fn put(&self, text: &str, embedding: Vec<f32>) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.put(digest(text), embedding);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

fn digest(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_get_roundtrip() {
        let cache = EmbeddingCache::new(10);
        cache.put("library hours", vec![0.1, 0.2, 0.3]);
        assert_eq!(cache.get("library hours"), Some(vec![0.1, 0.2, 0.3]));
        assert_eq!(cache.get("something else"), None);
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let cache = EmbeddingCache::new(2);
        cache.put("a", vec![1.0]);
        cache.put("b", vec![2.0]);

        // Touch "a" so "b" becomes the LRU entry.
        assert!(cache.get("a").is_some());
        cache.put("c", vec![3.0]);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = EmbeddingCache::new(4);
        cache.put("a", vec![1.0]);
        cache.clear();
        assert!(cache.is_empty());
    }
}
