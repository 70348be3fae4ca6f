//! Security screening for the zanko orchestration core.
//!
//! Provides:
//! - **Filter**: one severity-tagged pattern table screening both raw user
//!   input and generated answers
//! - **Audit logging**: structured security event logging with pluggable
//!   sinks
//!
//! The filter is defense in depth: generated output is treated as
//! untrusted even when the input passed screening, so a model that
//! "agrees" to discuss configuration detail still never leaks it.

pub mod audit;
pub mod filter;

pub use audit::{AuditEntry, AuditLogger, AuditSink, SecurityEvent, TracingSink};
pub use filter::{redirect_message, SecurityFilter, Verdict};
