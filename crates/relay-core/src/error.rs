//! # Error Types
//!
//! Domain-specific error types for relay-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  relay-core errors (this file)                                         │
//! │  └── ValidationError  - Capture-time input failures                    │
//! │                                                                         │
//! │  relay-store errors (separate crate)                                   │
//! │  └── StoreError       - Durable queue failures                         │
//! │                                                                         │
//! │  relay-sync errors (separate crate)                                    │
//! │  └── SyncError        - Gateway / connectivity / pass failures         │
//! │                                                                         │
//! │  Flow: ValidationError surfaces immediately at capture;                │
//! │        StoreError/SyncError stay background (silent sync).             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, reason)
//! 3. Errors are enum variants, never String

use thiserror::Error;

/// Capture-time input validation errors.
///
/// These surface immediately to the capture flow; a record that fails
/// validation never enters a queue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A field exceeds its maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// A field has an invalid format.
    #[error("{field} is invalid: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A numeric field is out of range.
    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: String, value: String },

    /// A collection field is empty where at least one element is required.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },
}
