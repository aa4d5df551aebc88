//! # Store Error Types
//!
//! Error types for durable queue operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds the queue key and categorization      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SyncError in relay-sync ← Corrupt queues are recovered (logged,       │
//! │       │                     treated as empty), never crash a pass      │
//! │       ▼                                                                 │
//! │  Capture flow surfaces append failures immediately                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable queue store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persisted queue bytes cannot be decoded as a JSON array.
    ///
    /// ## When This Occurs
    /// - Partial write from a crashed process predating WAL mode
    /// - Manual tampering with the database file
    ///
    /// `read_all` never returns this for a missing row; absence is an empty
    /// queue, not corruption.
    #[error("Queue '{queue_key}' is corrupt: {detail}")]
    Corrupt { queue_key: String, detail: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// A record could not be serialized for persistence.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_error_names_the_queue() {
        let err = StoreError::Corrupt {
            queue_key: "offline.orders".into(),
            detail: "expected a JSON array".into(),
        };
        assert!(err.to_string().contains("offline.orders"));
    }
}
