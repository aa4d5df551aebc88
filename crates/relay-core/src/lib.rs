//! # relay-core: Pure Domain Types for Relay POS
//!
//! This crate defines the domain layer of the offline-first sync engine:
//! which business-record categories exist, what a queued record for each of
//! them looks like on the wire, and which capture-time validation rules
//! apply before a record may enter a queue.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Relay POS Domain Layer                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    relay-core (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌────────────────┐  │   │
//! │  │   │    Domain     │   │    Records    │   │   Validation   │  │   │
//! │  │   │  (domain.rs)  │   │ (records.rs)  │   │(validation.rs) │  │   │
//! │  │   │               │   │               │   │                │  │   │
//! │  │   │ 6 categories  │   │ OrderInput    │   │ required-field │  │   │
//! │  │   │ storage keys  │   │ StockItemInput│   │ decimal/qty    │  │   │
//! │  │   │ operation     │   │ ...           │   │ timestamp      │  │   │
//! │  │   │ names         │   │               │   │ checks         │  │   │
//! │  │   └───────────────┘   └───────────────┘   └────────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       ▲                          ▲                                      │
//! │       │                          │                                      │
//! │  relay-store                relay-sync                                  │
//! │  (queue keys)               (operation names, variables shape)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`domain`] - The `Domain` registry: one entry per synchronized category
//! - [`records`] - Queued record shapes, field-for-field on the wire contract
//! - [`validation`] - Capture-time validation (surfaces immediately to the UI)
//! - [`error`] - Validation error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod domain;
pub mod error;
pub mod records;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================

pub use domain::Domain;
pub use error::ValidationError;
pub use records::{
    CashCollectionInput, InternalConsumptionInput, OrderInput, OrderLine, PriceAdjustmentInput,
    StockItemInput, StockTakeInput,
};
