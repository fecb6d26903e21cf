//! Safety module for NextYou — the pre-call content filter and audit logging.
//!
//! Provides:
//! - **Filter**: case-insensitive denylist screening of raw user messages
//! - **Audit logging**: structured records of blocked messages and upstream failures

pub mod audit;
pub mod filter;

pub use audit::{AuditEntry, AuditEvent, AuditLogger, AuditOutcome, AuditSink, TracingSink};
pub use filter::{DEFAULT_BLOCKED_KEYWORDS, REFUSAL_MESSAGE, SafetyFilter, ScreenOutcome};
