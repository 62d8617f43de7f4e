//! Infrastructure layer for grant-council
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the SQLite council store, configuration file loading,
//! the JSONL audit log and dataset file reading.

pub mod config;
pub mod dataset;
pub mod logging;
pub mod sqlite;

// Re-export commonly used types
pub use config::{
    ConfigLoader, DEFAULT_DATABASE_PATH, FileAssignmentConfig, FileConfig, FileDatabaseConfig,
    FileLoggingConfig, FileOutputConfig, FileOutputFormat,
};
pub use dataset::{DatasetFileError, read_dataset};
pub use logging::JsonlAuditLogger;
pub use sqlite::{CURRENT_SCHEMA_VERSION, SqliteCouncilStore};
