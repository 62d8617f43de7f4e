//! Port for structured audit logging.
//!
//! Defines the [`AuditLogger`] trait for recording what the assignment and
//! registration use cases did to the council's records (sessions started,
//! candidates rejected, assignments committed, datasets loaded).
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures a
//! machine-readable trail (JSONL) of every change.

use serde_json::Value;

/// A structured audit event.
///
/// Each event has a type string and a JSON payload containing event-specific
/// fields. The adapter adds the timestamp.
pub struct AuditEvent {
    /// Event type identifier (e.g., "assignment_committed", "dataset_loaded").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging audit events.
///
/// `log` is synchronous and infallible: a failing audit sink must never
/// undo or block a committed write.
pub trait AuditLogger: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when audit logging is disabled.
pub struct NoAuditLogger;

impl AuditLogger for NoAuditLogger {
    fn log(&self, _event: AuditEvent) {}
}
