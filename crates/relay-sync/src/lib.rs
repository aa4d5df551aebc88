//! # Relay POS Offline Sync Engine
//!
//! Drains the per-domain offline write queues against the remote GraphQL
//! gateway. A record leaves its queue if and only if its remote mutation
//! durably succeeded; everything else is retained for the next pass.
//!
//! ## Engine Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           relay-sync                                    │
//! │                                                                         │
//! │  orchestrator ── owns 6 runner tasks, startup/regained/periodic        │
//! │  worker ──────── generic pass engine: gate, drain, retry, commit       │
//! │  gateway ─────── GraphQL-over-HTTP mutation client (no retries)        │
//! │  connectivity ── TCP reachability probe + watch-channel transitions    │
//! │  config ──────── TOML file + env overrides (retry, schedule, probe)    │
//! │  report ──────── per-pass results for logging and observers            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod connectivity;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod report;
pub mod worker;

// Re-export the surface an embedding app needs.
pub use config::{ConnectivitySettings, GatewaySettings, RetryPolicy, ScheduleSettings, SyncConfig};
pub use connectivity::{
    ConnectivityMonitor, ConnectivityState, ManualMonitor, ProbeConfig, ProbeMonitor,
};
pub use error::{RemoteError, SyncError, SyncResult};
pub use gateway::{GraphqlGateway, MutationGateway};
pub use orchestrator::{EngineHandle, SyncEngine, TriggerReason};
pub use report::{PassOutcome, PassReport};
pub use worker::SyncWorker;
