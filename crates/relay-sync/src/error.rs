//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Remote      │  │      Storage            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Transport      │  │  Storage (query)        │ │
//! │  │  ConfigLoad     │  │  Timeout        │  │  StorageCorrupt         │ │
//! │  │  ConfigSave     │  │  Status         │  │  (recovered in-pass)    │ │
//! │  └─────────────────┘  │  Graphql        │  └─────────────────────────┘ │
//! │                       └─────────────────┘                              │
//! │  ┌────────────────────────────────────────────────────────────────────┐ │
//! │  │                              Internal                              │ │
//! │  │                                                                    │ │
//! │  │  InvalidUrl, Serialization                                         │ │
//! │  └────────────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Per-record remote failures NEVER surface as a pass error: the worker
//! retries then retains, and the pass completes. `SyncError` is reserved for
//! failures of the pass machinery itself.

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Error returned by a single gateway call.
///
/// The gateway performs NO retries - pacing is the worker's job, so retry
/// behavior stays visible and testable at that layer.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The request never produced an HTTP response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request timed out.
    ///
    /// Indistinguishable from "applied but the response was lost" - callers
    /// treat it as a failed attempt, accepting the duplicate-submission risk.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-success HTTP status.
    #[error("Remote returned HTTP {code}")]
    Status { code: u16 },

    /// The GraphQL layer reported an error for the mutation.
    #[error("GraphQL error for {operation}: {message}")]
    Graphql { operation: String, message: String },

    /// The response body was not the expected shape.
    #[error("Invalid response for {operation}: {detail}")]
    InvalidResponse { operation: String, detail: String },

    /// No mutation document is registered for the operation name.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

impl RemoteError {
    /// Returns true if retrying the same call can plausibly succeed.
    ///
    /// Unknown operations and malformed responses will fail identically on
    /// every attempt; spending the retry budget on them just delays the rest
    /// of the queue.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RemoteError::Transport(_)
                | RemoteError::Timeout
                | RemoteError::Status { .. }
                | RemoteError::Graphql { .. }
        )
    }
}

/// Sync engine error type.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Invalid gateway endpoint URL.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Persisted queue bytes could not be decoded.
    ///
    /// Workers recover from this by logging and treating the queue as empty;
    /// it surfaces as an error only from direct store access.
    #[error("Queue storage corrupt: {0}")]
    StorageCorrupt(String),

    /// Queue store operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// A gateway call failed (carried inside pass reports, not thrown).
    #[error("Remote mutation failed: {0}")]
    Remote(#[from] RemoteError),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Failed to (de)serialize a payload.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<relay_store::StoreError> for SyncError {
    fn from(err: relay_store::StoreError) -> Self {
        match err {
            relay_store::StoreError::Corrupt { .. } => SyncError::StorageCorrupt(err.to_string()),
            other => SyncError::Storage(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_retryability() {
        assert!(RemoteError::Timeout.is_retryable());
        assert!(RemoteError::Transport("connection refused".into()).is_retryable());
        assert!(RemoteError::Status { code: 503 }.is_retryable());

        assert!(!RemoteError::UnknownOperation("nope".into()).is_retryable());
        assert!(!RemoteError::InvalidResponse {
            operation: "placePosOrder".into(),
            detail: "missing data".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_store_corrupt_maps_to_storage_corrupt() {
        let store_err = relay_store::StoreError::Corrupt {
            queue_key: "offline.orders".into(),
            detail: "bad bytes".into(),
        };
        let sync_err: SyncError = store_err.into();
        assert!(matches!(sync_err, SyncError::StorageCorrupt(_)));
    }
}
