//! Configuration loading, validation, and management for zanko.
//!
//! Loads configuration from a `zanko.toml` file with environment variable
//! overrides (`ZANKO_*`). Every tunable of the orchestration core lives
//! here; validation runs at load time so a bad deployment fails at startup
//! rather than mid-request.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `zanko.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fixed-window rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Conversation session memory
    #[serde(default)]
    pub session: SessionConfig,

    /// Response and embedding cache capacities
    #[serde(default)]
    pub cache: CacheConfig,

    /// Token budget planning
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Provider call behavior
    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per client per window.
    #[serde(default = "default_rate_limit")]
    pub limit: u32,

    /// Window length in seconds.
    #[serde(default = "default_rate_window_secs")]
    pub window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Messages kept per session; older messages are evicted first.
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Sessions idle longer than this are removed by the sweep.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Minimum interval between opportunistic sweeps at request start.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Response cache capacity (oldest-inserted evicted beyond this).
    #[serde(default = "default_cache_capacity")]
    pub response_capacity: usize,

    /// Embedding cache capacity (LRU).
    #[serde(default = "default_cache_capacity")]
    pub embedding_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Total prompt+output token budget per request.
    #[serde(default = "default_total_tokens")]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Per-call timeout for provider completions, in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum accepted user message length, in characters.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

fn default_rate_limit() -> u32 {
    50
}
fn default_rate_window_secs() -> u64 {
    3600
}
fn default_max_history() -> usize {
    10
}
fn default_idle_timeout_secs() -> u64 {
    3600
}
fn default_sweep_interval_secs() -> u64 {
    60
}
fn default_cache_capacity() -> usize {
    1000
}
fn default_total_tokens() -> u32 {
    4000
}
fn default_provider_timeout_secs() -> u64 {
    30
}
fn default_max_message_chars() -> usize {
    1000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: default_rate_limit(),
            window_secs: default_rate_window_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            idle_timeout_secs: default_idle_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            response_capacity: default_cache_capacity(),
            embedding_capacity: default_cache_capacity(),
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            total_tokens: default_total_tokens(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_provider_timeout_secs(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            session: SessionConfig::default(),
            cache: CacheConfig::default(),
            budget: BudgetConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `zanko.toml` in the working directory.
    ///
    /// Environment variable overrides (highest priority):
    /// - `ZANKO_RATE_LIMIT` — requests per window
    /// - `ZANKO_MAX_HISTORY` — messages kept per session
    /// - `ZANKO_SESSION_TIMEOUT_SECS` — idle expiry
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new("zanko.toml"))?;

        if let Some(limit) = env_parse("ZANKO_RATE_LIMIT") {
            config.rate_limit.limit = limit;
        }
        if let Some(max_history) = env_parse("ZANKO_MAX_HISTORY") {
            config.session.max_history = max_history;
        }
        if let Some(timeout) = env_parse("ZANKO_SESSION_TIMEOUT_SECS") {
            config.session.idle_timeout_secs = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.limit == 0 {
            return Err(ConfigError::ValidationError(
                "rate_limit.limit must be at least 1".into(),
            ));
        }
        if self.session.max_history == 0 {
            return Err(ConfigError::ValidationError(
                "session.max_history must be at least 1".into(),
            ));
        }
        if self.cache.response_capacity == 0 || self.cache.embedding_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "cache capacities must be at least 1".into(),
            ));
        }
        if self.budget.total_tokens < 200 {
            return Err(ConfigError::ValidationError(
                "budget.total_tokens must leave room for a minimal answer (>= 200)".into(),
            ));
        }
        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rate_limit.limit, 50);
        assert_eq!(config.session.max_history, 10);
        assert_eq!(config.budget.total_tokens, 4000);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.rate_limit.limit, config.rate_limit.limit);
        assert_eq!(parsed.session.max_history, config.session.max_history);
    }

    #[test]
    fn zero_rate_limit_rejected() {
        let config = AppConfig {
            rate_limit: RateLimitConfig {
                limit: 0,
                ..RateLimitConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/zanko.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().session.idle_timeout_secs, 3600);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let parsed: AppConfig = toml::from_str("[session]\nmax_history = 5\n").unwrap();
        assert_eq!(parsed.session.max_history, 5);
        assert_eq!(parsed.session.idle_timeout_secs, 3600);
        assert_eq!(parsed.rate_limit.limit, 50);
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("max_history"));
        assert!(toml_str.contains("total_tokens"));
    }
}
