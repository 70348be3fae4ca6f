//! Response cache — content+context addressed cache of final answers.
//!
//! The key is a SHA-256 digest of the normalized query text plus a bounded
//! snapshot of the two most recent conversation messages, so the same
//! question asked in different conversational contexts is cached
//! separately. The answer to "tell me more about it" legitimately differs
//! with what "it" was.
//!
//! Eviction is purely size-bounded: oldest-inserted entries go first once
//! the capacity is reached. No TTL.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use zanko_core::message::Message;

/// How much of each context message participates in the key.
const CONTEXT_SNAPSHOT_CHARS: usize = 50;

/// Derive the deterministic cache key for a query in its conversational
/// context. Identical (query, context-snapshot) pairs always produce the
/// same key.
pub fn cache_key(query: &str, context: &[Message]) -> String {
    let normalized = normalize(query);

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let recent = &context[context.len().saturating_sub(2)..];
    for msg in recent {
        hasher.update([0u8]); // separator so snippet boundaries can't collide
        hasher.update(prefix_chars(&msg.content, CONTEXT_SNAPSHOT_CHARS).as_bytes());
    }

    format!("{:x}", hasher.finalize())
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max` characters of `s`, never splitting inside a code point.
fn prefix_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    map: HashMap<String, String>,
    insertion_order: VecDeque<String>,
}

/// Bounded answer cache with oldest-inserted-first eviction.
#[derive(Debug)]
pub struct ResponseCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Look up a cached answer.
    pub fn get(&self, key: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.map.get(key).cloned()
    }

    /// Insert an answer, evicting the oldest entries beyond capacity.
    pub fn insert(&self, key: String, answer: String) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if inner.map.insert(key.clone(), answer).is_none() {
            inner.insertion_order.push_back(key);
        }

        while inner.map.len() > self.capacity {
            match inner.insertion_order.pop_front() {
                Some(oldest) => {
                    inner.map.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.map.clear();
        inner.insertion_order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic() {
        let context = vec![
            Message::user("Where is the College of Engineering?"),
            Message::assistant("On the new campus, Kirkuk road."),
        ];
        let a = cache_key("when does it open?", &context);
        let b = cache_key("when does it open?", &context);
        assert_eq!(a, b);
    }

    #[test]
    fn key_normalizes_whitespace_and_case() {
        let a = cache_key("  When does   IT open?", &[]);
        let b = cache_key("when does it open?", &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn differing_context_produces_differing_keys() {
        let engineering = vec![
            Message::user("Where is the College of Engineering?"),
            Message::assistant("On the new campus."),
        ];
        let library = vec![
            Message::user("Where is the central library?"),
            Message::assistant("Next to the main gate."),
        ];
        assert_ne!(
            cache_key("when does it open?", &engineering),
            cache_key("when does it open?", &library)
        );
    }

    #[test]
    fn only_last_two_messages_participate() {
        let long: Vec<Message> = (0..6).map(|i| Message::user(format!("m{i}"))).collect();
        let short = long[4..].to_vec();
        assert_eq!(cache_key("q", &long), cache_key("q", &short));
    }

    #[test]
    fn kurdish_context_truncates_on_char_boundary() {
        // 60 multi-byte chars; a byte-indexed slice at 50 would panic.
        let context = vec![Message::user("زانکۆی سلێمانی ".repeat(4))];
        let _ = cache_key("زیاتر باسی بکە", &context);
    }

    #[test]
    fn get_and_insert_roundtrip() {
        let cache = ResponseCache::new(10);
        cache.insert("k1".into(), "answer".into());
        assert_eq!(cache.get("k1").as_deref(), Some("answer"));
        assert_eq!(cache.get("k2"), None);
    }

    #[test]
    fn oldest_inserted_evicted_first() {
        let cache = ResponseCache::new(2);
        cache.insert("first".into(), "1".into());
        cache.insert("second".into(), "2".into());
        cache.insert("third".into(), "3".into());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("first"), None);
        assert_eq!(cache.get("second").as_deref(), Some("2"));
        assert_eq!(cache.get("third").as_deref(), Some("3"));
    }

    #[test]
    fn reinserting_a_key_does_not_grow_the_cache() {
        let cache = ResponseCache::new(2);
        cache.insert("k".into(), "old".into());
        cache.insert("k".into(), "new".into());
        cache.insert("other".into(), "x".into());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = ResponseCache::new(10);
        cache.insert("k".into(), "v".into());
        cache.clear();
        assert!(cache.is_empty());
    }
}
