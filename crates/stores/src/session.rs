//! Session store — bounded, idle-expiring conversation histories.
//!
//! A session is an ordered sequence of messages keyed by an opaque id.
//! Histories are truncated to the most recent `max_history` messages on
//! every append, and sessions idle past a timeout are removed by the
//! expiry sweep. Sessions are created lazily: resolving an unknown id
//! allocates a fresh one, and appending to an absent id creates it.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use zanko_core::error::ChatError;
use zanko_core::message::{Message, SessionId};

#[derive(Debug, Clone)]
struct Session {
    messages: Vec<Message>,
    last_active: DateTime<Utc>,
}

/// A page of session history for external inspection.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    /// The most recent messages, oldest first, at most the requested count.
    pub messages: Vec<Message>,
    /// Total messages currently retained in the session.
    pub total_messages: usize,
}

/// Shared store of conversation sessions.
///
/// Thread-safe via `std::sync::RwLock`; every operation takes the lock
/// briefly and never across an `.await`.
#[derive(Debug)]
pub struct SessionStore {
    max_history: usize,
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl SessionStore {
    /// Create a store keeping at most `max_history` messages per session.
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a session id for a request.
    ///
    /// Returns the given id if it names a live session (refreshing its
    /// last-active time), otherwise allocates a fresh id with an empty
    /// session.
    pub fn resolve(&self, requested: Option<&SessionId>) -> SessionId {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());

        if let Some(id) = requested {
            if let Some(session) = sessions.get_mut(id) {
                session.last_active = Utc::now();
                return id.clone();
            }
        }

        let id = SessionId::new();
        sessions.insert(
            id.clone(),
            Session {
                messages: Vec::new(),
                last_active: Utc::now(),
            },
        );
        id
    }

    /// Append a message, creating the session if absent, then truncate the
    /// history to the most recent `max_history` messages.
    pub fn append(&self, id: &SessionId, message: Message) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());

        let session = sessions.entry(id.clone()).or_insert_with(|| Session {
            messages: Vec::new(),
            last_active: Utc::now(),
        });

        session.messages.push(message);
        if session.messages.len() > self.max_history {
            let excess = session.messages.len() - self.max_history;
            session.messages.drain(..excess);
        }
        session.last_active = Utc::now();
    }

    /// The full retained history of a session, oldest first.
    /// Empty for unknown ids.
    pub fn context(&self, id: &SessionId) -> Vec<Message> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions
            .get(id)
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    /// The most recent `max_items` messages of a session, for inspection
    /// and debugging. Unlike conversational flow, an unknown id here is an
    /// explicit lookup failure.
    pub fn history(&self, id: &SessionId, max_items: usize) -> Result<SessionHistory, ChatError> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        let session = sessions.get(id).ok_or(ChatError::SessionNotFound)?;

        let total_messages = session.messages.len();
        let skip = total_messages.saturating_sub(max_items);
        Ok(SessionHistory {
            messages: session.messages[skip..].to_vec(),
            total_messages,
        })
    }

    /// Explicitly delete a session. Returns whether it existed.
    pub fn delete(&self, id: &SessionId) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .is_some()
    }

    /// Remove every session idle longer than `idle_timeout` as of `now`.
    /// Returns the count removed.
    pub fn expire_sweep(&self, now: DateTime<Utc>, idle_timeout: Duration) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_active <= idle_timeout);
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::info!(removed, "Cleaned up expired sessions");
        }
        removed
    }

    /// Number of live sessions.
    pub fn active_sessions(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Total messages retained across all sessions.
    pub fn total_messages(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(|s| s.messages.len())
            .sum()
    }

    /// Drop all sessions.
    pub fn clear(&self) {
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
