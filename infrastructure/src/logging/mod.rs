//! Logging infrastructure: the assignment audit trail.
//!
//! Provides [`JsonlAuditLogger`], a JSONL file writer that implements the
//! [`AuditLogger`](council_application::AuditLogger) port.

mod jsonl_audit_logger;

pub use jsonl_audit_logger::JsonlAuditLogger;
