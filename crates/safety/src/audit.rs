//! Audit logging — structured records of safety-relevant turn outcomes.
//!
//! Blocked messages never reach the chat log, so this is where they are
//! recorded. Entries are kept in a bounded in-memory ring and forwarded to
//! any configured sinks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Entries retained in memory before the oldest are evicted.
pub const DEFAULT_AUDIT_CAPACITY: usize = 1_000;

/// A single audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
    pub outcome: AuditOutcome,
    pub details: Option<String>,
}

/// Types of auditable events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// The denylist stopped a message before composition
    MessageBlocked { keyword: String },
    /// The model call failed and the generic apology was returned
    UpstreamFailure { provider: String },
}

/// Outcome of an audited operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Denied,
    Failure,
}

/// Trait for audit log sinks (where events are written).
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// Bounded in-memory audit logger with pluggable sinks.
pub struct AuditLogger {
    entries: Mutex<VecDeque<AuditEntry>>,
    capacity: usize,
    sinks: Vec<Box<dyn AuditSink>>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("entry_count", &self.count())
            .field("capacity", &self.capacity)
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLogger {
    /// Create a new audit logger with no sinks.
    pub fn new() -> Self {
        Self::with_sinks(Vec::new())
    }

    /// Create a new audit logger with the given sinks.
    pub fn with_sinks(sinks: Vec<Box<dyn AuditSink>>) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: DEFAULT_AUDIT_CAPACITY,
            sinks,
        }
    }

    /// A logger that forwards every entry to `tracing`.
    pub fn tracing() -> Self {
        Self::with_sinks(vec![Box::new(TracingSink)])
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Record an audit event.
    pub fn log(&self, event: AuditEvent, outcome: AuditOutcome, details: Option<String>) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            event,
            outcome,
            details,
        };

        {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            if entries.len() >= self.capacity {
                entries.pop_front();
            }
            entries.push_back(entry.clone());
        }

        for sink in &self.sinks {
            sink.record(&entry);
        }
    }

    /// Get all retained entries, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// Get entries filtered by outcome.
    pub fn entries_by_outcome(&self, outcome: &AuditOutcome) -> Vec<AuditEntry> {
        self.entries()
            .into_iter()
            .filter(|e| &e.outcome == outcome)
            .collect()
    }

    /// Count of retained entries.
    pub fn count(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// A tracing-based audit sink that logs entries via `tracing::info!`.
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, entry: &AuditEntry) {
        tracing::info!(
            event = ?entry.event,
            outcome = ?entry.outcome,
            details = ?entry.details,
            "AUDIT"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn log_and_retrieve_entries() {
        let logger = AuditLogger::new();
        logger.log(
            AuditEvent::MessageBlocked {
                keyword: "injury".into(),
            },
            AuditOutcome::Denied,
            None,
        );
        logger.log(
            AuditEvent::UpstreamFailure {
                provider: "groq".into(),
            },
            AuditOutcome::Failure,
            Some("Network error: connection refused".into()),
        );

        assert_eq!(logger.count(), 2);
        assert_eq!(logger.entries_by_outcome(&AuditOutcome::Denied).len(), 1);
        assert_eq!(logger.entries_by_outcome(&AuditOutcome::Failure).len(), 1);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let logger = AuditLogger::new().with_capacity(2);
        for keyword in ["pain", "disease", "supplement"] {
            logger.log(
                AuditEvent::MessageBlocked {
                    keyword: keyword.into(),
                },
                AuditOutcome::Denied,
                None,
            );
        }

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].event,
            AuditEvent::MessageBlocked {
                keyword: "disease".into()
            }
        );
    }

    struct CountingSink(Arc<Mutex<usize>>);

    impl AuditSink for CountingSink {
        fn record(&self, _entry: &AuditEntry) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn entries_are_forwarded_to_sinks() {
        let counter = Arc::new(Mutex::new(0));
        let logger = AuditLogger::with_sinks(vec![Box::new(CountingSink(counter.clone()))]);
        logger.log(
            AuditEvent::MessageBlocked {
                keyword: "pain".into(),
            },
            AuditOutcome::Denied,
            None,
        );
        assert_eq!(*counter.lock().unwrap(), 1);
    }

    #[test]
    fn event_serializes_tagged() {
        let json = serde_json::to_value(AuditEvent::MessageBlocked {
            keyword: "pain".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "message_blocked");
        assert_eq!(json["keyword"], "pain");
    }
}
