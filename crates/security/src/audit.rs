//! Audit logging — structured security event logging.
//!
//! Records every screening decision and rate-limit rejection for
//! monitoring. Entries keep a truncated copy of the offending request but
//! never the matched pattern itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Types of auditable security events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecurityEvent {
    /// Input matched an injection indicator and was refused.
    InjectionBlocked { category: String },
    /// Input matched a disclosure request and got the scope template.
    DisclosureRedirected { category: String },
    /// A generated answer was replaced by the scope template.
    ResponseFiltered { category: String },
    /// A client hit its request limit.
    RateLimited,
}

/// A single audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event: SecurityEvent,
    /// Normalized client key (source address).
    pub client: String,
    /// Truncated request/response excerpt, for investigation.
    pub detail: Option<String>,
}

/// Trait for audit log sinks (where events are written).
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// Sink that forwards entries to `tracing` at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, entry: &AuditEntry) {
        tracing::warn!(
            client = %entry.client,
            event = ?entry.event,
            detail = entry.detail.as_deref().unwrap_or(""),
            "SECURITY EVENT"
        );
    }
}

/// In-memory audit logger that also forwards to its sinks.
pub struct AuditLogger {
    entries: std::sync::Mutex<Vec<AuditEntry>>,
    sinks: Vec<Box<dyn AuditSink>>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.lock().unwrap_or_else(|e| e.into_inner()).len();
        f.debug_struct("AuditLogger")
            .field("entry_count", &count)
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::with_sinks(vec![Box::new(TracingSink)])
    }
}

impl AuditLogger {
    /// Create a logger with no sinks (entries are only stored in memory).
    pub fn new() -> Self {
        Self::with_sinks(Vec::new())
    }

    /// Create a logger with the given sinks.
    pub fn with_sinks(sinks: Vec<Box<dyn AuditSink>>) -> Self {
        Self {
            entries: std::sync::Mutex::new(Vec::new()),
            sinks,
        }
    }

    /// Record a security event.
    pub fn log(&self, event: SecurityEvent, client: &str, detail: Option<String>) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            event,
            client: client.into(),
            detail,
        };

        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());

        for sink in &self.sinks {
            sink.record(&entry);
        }
    }

    /// All recorded entries.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logged_events_are_stored() {
        let logger = AuditLogger::new();
        logger.log(
            SecurityEvent::InjectionBlocked {
                category: "sql_quotes".into(),
            },
            "10.0.0.1",
            Some("' OR 1=1".into()),
        );
        logger.log(SecurityEvent::RateLimited, "10.0.0.2", None);

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].client, "10.0.0.1");
        assert_eq!(entries[1].event, SecurityEvent::RateLimited);
    }

    #[test]
    fn event_serialization_tags_type() {
        let event = SecurityEvent::ResponseFiltered {
            category: "sensitive_terms".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("response_filtered"));
    }

    #[test]
    fn custom_sink_receives_entries() {
        struct Counting(std::sync::Mutex<usize>);
        impl AuditSink for Counting {
            fn record(&self, _entry: &AuditEntry) {
                *self.0.lock().unwrap() += 1;
            }
        }

        let sink = std::sync::Arc::new(Counting(std::sync::Mutex::new(0)));
        struct Forward(std::sync::Arc<Counting>);
        impl AuditSink for Forward {
            fn record(&self, entry: &AuditEntry) {
                self.0.record(entry);
            }
        }

        let logger = AuditLogger::with_sinks(vec![Box::new(Forward(sink.clone()))]);
        logger.log(SecurityEvent::RateLimited, "10.0.0.1", None);
        assert_eq!(*sink.0.lock().unwrap(), 1);
    }
}
