//! # relay-store: Durable Queue Store for Relay POS
//!
//! This crate persists the per-domain offline write queues. Each domain owns
//! exactly one logical key holding a serialized JSON array of pending
//! records; the unit of mutation is always the whole array.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Relay POS Data Flow                              │
//! │                                                                         │
//! │  Capture flow (one record per user submission)                         │
//! │       │ append                                                          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    relay-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  QueueStore   │    │QueueRepository│    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (queue.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ append        │    │ 001_offline_ │  │   │
//! │  │   │ WAL mode      │    │ read_all      │    │ queues.sql   │  │   │
//! │  │   │ Migrations    │    │ replace_all   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       ▲ read_all (snapshot)         │ replace_all (commit)             │
//! │       │                             ▼                                   │
//! │  relay-sync worker pass (drain and write back retained records)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//! - [`queue`] - The queue repository (append / read_all / replace_all)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_store::{QueueStore, StoreConfig};
//! use relay_core::Domain;
//!
//! let store = QueueStore::new(StoreConfig::new("relay.db")).await?;
//!
//! store.queues().append(Domain::Orders.storage_key(), &order).await?;
//! let pending = store.queues().read_all(Domain::Orders.storage_key()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod queue;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{QueueStore, StoreConfig};
pub use queue::QueueRepository;
