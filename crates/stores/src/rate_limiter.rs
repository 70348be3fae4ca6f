//! Fixed-window rate limiter keyed by client address.
//!
//! Pure fixed-window counting: the first request for a key opens a window
//! and counts 1; requests inside the window count up to the limit and are
//! then rejected; the first request after the window elapses resets the
//! counter to 1. No smoothing — a client may burst up to `limit` requests
//! at a window boundary. That trade-off buys a much simpler shared state
//! than a token bucket.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Per-client counter state.
#[derive(Debug, Clone)]
struct RateRecord {
    count: u32,
    window_start: DateTime<Utc>,
}

/// Shared fixed-window rate limiter.
///
/// Thread-safe via `std::sync::Mutex` (non-async, held briefly). Records
/// are created lazily per client key and evicted by [`RateLimiter::sweep`].
#[derive(Debug, Default)]
pub struct RateLimiter {
    records: Mutex<HashMap<String, RateRecord>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a request from `client_key` is allowed right now.
    ///
    /// Mutates shared state: increments the in-window counter or resets it
    /// when the window has elapsed.
    pub fn allow(&self, client_key: &str, limit: u32, window: Duration) -> bool {
        self.allow_at(client_key, limit, window, Utc::now())
    }

    /// Clock-injected variant of [`RateLimiter::allow`].
    pub fn allow_at(
        &self,
        client_key: &str,
        limit: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());

        let record = records.entry(client_key.to_string()).or_insert(RateRecord {
            count: 0,
            window_start: now,
        });

        if now - record.window_start > window {
            record.count = 1;
            record.window_start = now;
            return true;
        }

        if record.count >= limit {
            return false;
        }

        record.count += 1;
        true
    }

    /// Evict records whose window started more than `max_idle` before `now`.
    ///
    /// Without this the client-key table grows with client churn over long
    /// uptimes. An expired record would reset on its next request anyway,
    /// so eviction never changes an allow/reject decision. Returns the
    /// number of records removed.
    pub fn sweep(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let before = records.len();
        records.retain(|_, r| now - r.window_start <= max_idle);
        let removed = before - records.len();
        if removed > 0 {
            tracing::debug!(removed, "Swept stale rate-limit records");
        }
        removed
    }

    /// Number of tracked client keys.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all records.
    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour() -> Duration {
        Duration::seconds(3600)
    }

    #[test]
    fn allows_up_to_limit_within_window() {
        let limiter = RateLimiter::new();
        let now = Utc::now();

        for n in 1..=50 {
            assert!(
                limiter.allow_at("10.0.0.1", 50, hour(), now),
                "request {n} should be allowed"
            );
        }
        assert!(!limiter.allow_at("10.0.0.1", 50, hour(), now));
    }

    #[test]
    fn window_expiry_resets_counter() {
        let limiter = RateLimiter::new();
        let start = Utc::now();

        for _ in 0..50 {
            assert!(limiter.allow_at("10.0.0.1", 50, hour(), start));
        }
        assert!(!limiter.allow_at("10.0.0.1", 50, hour(), start));

        // Just past the window: counter resets to 1 and the request passes.
        let later = start + Duration::seconds(3601);
        assert!(limiter.allow_at("10.0.0.1", 50, hour(), later));

        // The reset really was to 1, not a fresh limit-sized budget mid-window.
        for _ in 0..49 {
            assert!(limiter.allow_at("10.0.0.1", 50, hour(), later));
        }
        assert!(!limiter.allow_at("10.0.0.1", 50, hour(), later));
    }

    #[test]
    fn clients_are_independent() {
        let limiter = RateLimiter::new();
        let now = Utc::now();

        assert!(limiter.allow_at("10.0.0.1", 1, hour(), now));
        assert!(!limiter.allow_at("10.0.0.1", 1, hour(), now));
        assert!(limiter.allow_at("10.0.0.2", 1, hour(), now));
    }

    #[test]
    fn sweep_evicts_stale_records_only() {
        let limiter = RateLimiter::new();
        let start = Utc::now();

        limiter.allow_at("old-client", 50, hour(), start);
        limiter.allow_at("new-client", 50, hour(), start + Duration::seconds(3000));
        assert_eq!(limiter.len(), 2);

        let removed = limiter.sweep(start + Duration::seconds(4000), hour());
        assert_eq!(removed, 1);
        assert_eq!(limiter.len(), 1);

        // The surviving client's window state is untouched.
        assert!(limiter.allow_at("new-client", 50, hour(), start + Duration::seconds(4000)));
    }

    #[test]
    fn clear_drops_everything() {
        let limiter = RateLimiter::new();
        limiter.allow("a", 50, hour());
        limiter.allow("b", 50, hour());
        limiter.clear();
        assert!(limiter.is_empty());
    }
}
