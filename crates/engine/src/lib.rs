//! The zanko request dispatcher.
//!
//! [`ChatEngine`] is the orchestration layer between a raw chat request
//! and the outbound model call. Per request it runs:
//!
//! rate check → input screen → session resolve → cache lookup →
//! retrieval → classification → context build → budget plan →
//! provider call (with one fallback substitution) → output screen →
//! cache write → session append.
//!
//! The four shared stores (rate limiter, sessions, response cache,
//! embedding cache) are owned here and injected at construction; they are
//! the only cross-request state. Store locks are brief and synchronous —
//! the engine reads what it needs, releases, awaits the external call,
//! then re-acquires to write results.

pub mod prompt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use zanko_config::AppConfig;
use zanko_core::error::{ChatError, ProviderError, Result};
use zanko_core::lang::{Complexity, Language};
use zanko_core::message::{Message, SessionId};
use zanko_core::provider::{CompletionRequest, Provider};
use zanko_core::retrieval::{Retriever, Snippet};
use zanko_query::budget::{limits, BudgetPlanner};
use zanko_query::classifier::{classify_complexity, detect_language, is_followup, preprocess_query};
use zanko_query::context::ContextExtractor;
use zanko_security::audit::{AuditLogger, SecurityEvent};
use zanko_security::filter::{redirect_message, SecurityFilter, Verdict};
use zanko_stores::{cache_key, EmbeddingCache, RateLimiter, ResponseCache, SessionStore};
pub use zanko_stores::SessionHistory;

/// How much of an offending request is kept in an audit entry.
const AUDIT_EXCERPT_CHARS: usize = 100;

/// An incoming chat request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The raw user message.
    pub message: String,

    /// Session id for conversation continuity; a stale or missing id gets
    /// a fresh session.
    pub session_id: Option<SessionId>,

    /// Normalized client source address, the rate-limit key.
    pub client_key: String,
}

/// Where the answer came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Generated by the named provider.
    Provider(String),
    /// Served from the response cache.
    Cache,
    /// Replaced by the security filter's scope template.
    SecurityFilter,
}

/// A completed chat response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub answer: String,
    pub source: ResponseSource,
    pub session_id: SessionId,
}

/// Store counters for the administrative surface.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub active_sessions: usize,
    pub total_messages: usize,
    pub rate_limit_entries: usize,
    pub response_cache_entries: usize,
    pub embedding_cache_entries: usize,
}

/// The request dispatcher. One instance per process; cheap to share via
/// `Arc`.
pub struct ChatEngine {
    config: AppConfig,
    primary: Arc<dyn Provider>,
    fallback: Option<Arc<dyn Provider>>,
    retriever: Arc<dyn Retriever>,

    filter: SecurityFilter,
    audit: AuditLogger,
    extractor: ContextExtractor,
    planner: BudgetPlanner,

    rate_limiter: RateLimiter,
    sessions: SessionStore,
    responses: ResponseCache,
    embeddings: Arc<EmbeddingCache>,

    last_sweep: Mutex<DateTime<Utc>>,
}

impl ChatEngine {
    /// Build an engine with fresh stores.
    pub fn new(
        config: AppConfig,
        primary: Arc<dyn Provider>,
        fallback: Option<Arc<dyn Provider>>,
        retriever: Arc<dyn Retriever>,
    ) -> Self {
        Self {
            planner: BudgetPlanner::new(config.budget.total_tokens),
            rate_limiter: RateLimiter::new(),
            sessions: SessionStore::new(config.session.max_history),
            responses: ResponseCache::new(config.cache.response_capacity),
            embeddings: Arc::new(EmbeddingCache::new(config.cache.embedding_capacity)),
            filter: SecurityFilter::new(),
            audit: AuditLogger::default(),
            extractor: ContextExtractor::new(),
            last_sweep: Mutex::new(Utc::now()),
            config,
            primary,
            fallback,
            retriever,
        }
    }

    /// Handle one chat request end to end.
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.maybe_sweep();

        // RATE_CHECK — nothing external happens for a limited client.
        let rate = &self.config.rate_limit;
        if !self.rate_limiter.allow(
            &request.client_key,
            rate.limit,
            Duration::seconds(rate.window_secs as i64),
        ) {
            self.audit
                .log(SecurityEvent::RateLimited, &request.client_key, None);
            return Err(ChatError::RateLimitExceeded);
        }

        let message = request.message.trim();
        if message.is_empty() || message.chars().count() > self.config.provider.max_message_chars {
            return Err(ChatError::InputRejected);
        }

        let language = detect_language(message);

        // INPUT_SCREEN — rejections and redirections terminate before any
        // external call.
        match self.filter.screen_input(message) {
            Verdict::Reject { category } => {
                self.audit.log(
                    SecurityEvent::InjectionBlocked {
                        category: category.into(),
                    },
                    &request.client_key,
                    Some(excerpt(message)),
                );
                return Err(ChatError::InputRejected);
            }
            Verdict::Redirect { category } => {
                self.audit.log(
                    SecurityEvent::DisclosureRedirected {
                        category: category.into(),
                    },
                    &request.client_key,
                    Some(excerpt(message)),
                );
                let session_id = self.sessions.resolve(request.session_id.as_ref());
                return Ok(ChatResponse {
                    answer: redirect_message(language).into(),
                    source: ResponseSource::SecurityFilter,
                    session_id,
                });
            }
            Verdict::Allow => {}
        }

        // SESSION_RESOLVE — snapshot the history before this exchange.
        let session_id = self.sessions.resolve(request.session_id.as_ref());
        let history = self.sessions.context(&session_id);

        // CACHE_LOOKUP — the key covers the conversational context, so the
        // same question in a different conversation misses.
        let key = cache_key(message, &history);
        if let Some(answer) = self.responses.get(&key) {
            info!(session = %short(&session_id), "Cache hit for contextual query");
            return Ok(ChatResponse {
                answer,
                source: ResponseSource::Cache,
                session_id,
            });
        }

        // CLASSIFY / CONTEXT_BUILD
        let complexity = classify_complexity(message, language);
        let followup = is_followup(message, language);
        let conversation_context = self.extractor.extract(&history, message, language);

        // RETRIEVE → BUDGET_PLAN → PROVIDER_CALL, once against the primary
        // and at most once more against the fallback.
        let (answer, provider_name) = match self
            .attempt(&self.primary, message, &history, language, complexity, followup, &conversation_context)
            .await
        {
            Ok(answer) => (answer, self.primary.name().to_string()),
            Err(err) if err.is_recoverable() => {
                let Some(fallback) = self.fallback.as_ref() else {
                    return Err(ChatError::ProviderUnavailable(err));
                };
                warn!(
                    provider = self.primary.name(),
                    error = %err,
                    "Primary provider failed, trying fallback"
                );
                match self
                    .attempt(fallback, message, &history, language, complexity, followup, &conversation_context)
                    .await
                {
                    Ok(answer) => (answer, fallback.name().to_string()),
                    Err(err) => return Err(ChatError::ProviderUnavailable(err)),
                }
            }
            Err(err) => return Err(ChatError::ProviderUnavailable(err)),
        };

        // OUTPUT_SCREEN — generated text is untrusted; a filtered answer
        // is neither cached nor written into the session.
        if let Some(category) = self.filter.screen_output(&answer) {
            self.audit.log(
                SecurityEvent::ResponseFiltered {
                    category: category.into(),
                },
                &request.client_key,
                Some(excerpt(message)),
            );
            return Ok(ChatResponse {
                answer: redirect_message(language).into(),
                source: ResponseSource::SecurityFilter,
                session_id,
            });
        }

        // CACHE_WRITE / SESSION_APPEND
        self.responses.insert(key, answer.clone());
        self.sessions.append(&session_id, Message::user(message));
        self.sessions
            .append(&session_id, Message::assistant(answer.clone()));

        info!(
            session = %short(&session_id),
            provider = %provider_name,
            language = language.tag(),
            complexity = complexity.tag(),
            "Answered chat request"
        );

        Ok(ChatResponse {
            answer,
            source: ResponseSource::Provider(provider_name),
            session_id,
        })
    }

    /// One retrieval + prompt assembly + provider call. The fallback path
    /// repeats all of it, reusing the already-extracted conversation
    /// context so a fallback answer sees what the primary attempt saw.
    async fn attempt(
        &self,
        provider: &Arc<dyn Provider>,
        message: &str,
        history: &[Message],
        language: Language,
        complexity: Complexity,
        followup: bool,
        conversation_context: &str,
    ) -> std::result::Result<String, ProviderError> {
        let snippets = self
            .retrieve_snippets(message, language, complexity, followup)
            .await;

        let system_prompt =
            prompt::build_system_prompt(&snippets, language, complexity, conversation_context);

        // Last two exchanges plus the current query; the planner may cut
        // this further.
        let mut messages: Vec<Message> =
            history[history.len().saturating_sub(4)..].to_vec();
        messages.push(Message::user(message));

        let plan = self
            .planner
            .plan(&system_prompt, messages, language, complexity);

        let completion = CompletionRequest {
            system_prompt,
            messages: plan.messages,
            max_tokens: plan.max_tokens,
            temperature: limits(language, complexity).temperature,
        };

        let timeout = std::time::Duration::from_secs(self.config.provider.timeout_secs);
        match tokio::time::timeout(timeout, provider.complete(completion)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Transient(format!(
                "provider '{}' timed out after {}s",
                provider.name(),
                timeout.as_secs()
            ))),
        }
    }

    /// Retrieval with the simple-query shortcut and local degradation:
    /// unavailable retrieval means "no context", never a failed request.
    async fn retrieve_snippets(
        &self,
        message: &str,
        language: Language,
        complexity: Complexity,
        followup: bool,
    ) -> Vec<Snippet> {
        if complexity == Complexity::Simple && !followup {
            return Vec::new();
        }

        let processed = preprocess_query(message, language);
        let timeout = std::time::Duration::from_secs(self.config.provider.timeout_secs);
        match tokio::time::timeout(
            timeout,
            self.retriever.retrieve(&processed, language, complexity),
        )
        .await
        {
            Ok(Ok(snippets)) => snippets,
            Ok(Err(err)) => {
                warn!(error = %err, "Retrieval unavailable, continuing without knowledge context");
                Vec::new()
            }
            Err(_) => {
                warn!("Retrieval timed out, continuing without knowledge context");
                Vec::new()
            }
        }
    }

    /// Opportunistic maintenance at request start, at most once per
    /// configured interval: session idle expiry plus rate-record eviction.
    fn maybe_sweep(&self) {
        let now = Utc::now();
        {
            let mut last = self.last_sweep.lock().unwrap_or_else(|e| e.into_inner());
            if now - *last < Duration::seconds(self.config.session.sweep_interval_secs as i64) {
                return;
            }
            *last = now;
        }

        self.sessions
            .expire_sweep(now, Duration::seconds(self.config.session.idle_timeout_secs as i64));
        self.rate_limiter
            .sweep(now, Duration::seconds(self.config.rate_limit.window_secs as i64));
    }

    // ── Administrative surface ────────────────────────────────────────────

    /// Drop all response and embedding cache entries.
    pub fn clear_caches(&self) {
        self.responses.clear();
        self.embeddings.clear();
        info!("Caches cleared");
    }

    /// Run the session idle-expiry sweep now. Returns the count removed.
    pub fn sweep_sessions(&self) -> usize {
        self.sessions.expire_sweep(
            Utc::now(),
            Duration::seconds(self.config.session.idle_timeout_secs as i64),
        )
    }

    /// Current store counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            active_sessions: self.sessions.active_sessions(),
            total_messages: self.sessions.total_messages(),
            rate_limit_entries: self.rate_limiter.len(),
            response_cache_entries: self.responses.len(),
            embedding_cache_entries: self.embeddings.len(),
        }
    }

    /// Explicitly delete a session.
    pub fn delete_session(&self, id: &SessionId) -> Result<()> {
        if self.sessions.delete(id) {
            info!(session = %short(id), "Session cleared");
            Ok(())
        } else {
            Err(ChatError::SessionNotFound)
        }
    }

    /// The most recent messages of a session, for inspection.
    pub fn history(&self, id: &SessionId, max_items: usize) -> Result<SessionHistory> {
        self.sessions.history(id, max_items)
    }

    /// Shared handle for the retrieval collaborator's embedding lookups.
    /// Eviction stays under the engine's control.
    pub fn embedding_cache(&self) -> Arc<EmbeddingCache> {
        Arc::clone(&self.embeddings)
    }

    /// The security audit log.
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }
}

fn excerpt(message: &str) -> String {
    match message.char_indices().nth(AUDIT_EXCERPT_CHARS) {
        Some((idx, _)) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

/// First 8 chars of a session id, enough to correlate log lines.
fn short(id: &SessionId) -> &str {
    let end = id
        .0
        .char_indices()
        .nth(8)
        .map(|(idx, _)| idx)
        .unwrap_or(id.0.len());
    &id.0[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_bounds_long_messages() {
        let long = "x".repeat(500);
        assert_eq!(excerpt(&long).len(), 100);
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn short_id_handles_small_ids() {
        assert_eq!(short(&SessionId::from("abc")), "abc");
        assert_eq!(short(&SessionId::from("0123456789ab")), "01234567");
    }
}
