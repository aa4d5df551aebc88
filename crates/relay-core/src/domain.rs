//! # Domain Registry
//!
//! One entry per business-record category that the sync engine drains
//! independently. Each domain owns a storage key (its durable queue) and a
//! named remote mutation (its write operation).
//!
//! ## The Six Domains
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Domain                 │ Storage Key                  │ Mutation       │
//! │  ───────────────────────┼──────────────────────────────┼─────────────── │
//! │  Orders                 │ offline.orders               │ placePosOrder  │
//! │  StockItems             │ offline.stockItems           │ addStock       │
//! │  StockTakes             │ offline.stockTakes           │ createStockTake│
//! │  PriceAdjustments       │ offline.priceAdjustments     │ createPrice-   │
//! │                         │                              │   Adjustment   │
//! │  CashCollections        │ offline.cashCollections      │ createCash-    │
//! │                         │                              │   Collection   │
//! │  InternalConsumptions   │ offline.internalConsumptions │ addInternal-   │
//! │                         │                              │   Consumption  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Adding a domain means adding a variant here plus a record type in
//! [`crate::records`] - the sync engine itself is generic over this enum.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A business-record category synchronized independently of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Domain {
    /// POS orders placed at the till.
    Orders,

    /// Stock additions (goods received into inventory).
    StockItems,

    /// Stock takes (physical count vs system count reconciliation).
    StockTakes,

    /// Selling-price adjustments.
    PriceAdjustments,

    /// Cash collected from the till.
    CashCollections,

    /// Internal consumption records (stock used, not sold).
    InternalConsumptions,
}

impl Domain {
    /// All domains, in the order the orchestrator starts them.
    pub const ALL: [Domain; 6] = [
        Domain::Orders,
        Domain::StockItems,
        Domain::StockTakes,
        Domain::PriceAdjustments,
        Domain::CashCollections,
        Domain::InternalConsumptions,
    ];

    /// The logical key under which this domain's queue is persisted.
    pub const fn storage_key(&self) -> &'static str {
        match self {
            Domain::Orders => "offline.orders",
            Domain::StockItems => "offline.stockItems",
            Domain::StockTakes => "offline.stockTakes",
            Domain::PriceAdjustments => "offline.priceAdjustments",
            Domain::CashCollections => "offline.cashCollections",
            Domain::InternalConsumptions => "offline.internalConsumptions",
        }
    }

    /// The named remote mutation that writes one record of this domain.
    pub const fn operation_name(&self) -> &'static str {
        match self {
            Domain::Orders => "placePosOrder",
            Domain::StockItems => "addStock",
            Domain::StockTakes => "createStockTake",
            Domain::PriceAdjustments => "createPriceAdjustment",
            Domain::CashCollections => "createCashCollection",
            Domain::InternalConsumptions => "addInternalConsumption",
        }
    }

    /// Whether the remote operation takes the record wrapped in a single
    /// `input` variable, or the record's fields spread as top-level variables.
    ///
    /// The wire contract is uneven here: `createPriceAdjustment` and
    /// `createCashCollection` declare scalar variables, the other four take
    /// an input object.
    pub const fn wraps_input(&self) -> bool {
        match self {
            Domain::Orders
            | Domain::StockItems
            | Domain::StockTakes
            | Domain::InternalConsumptions => true,
            Domain::PriceAdjustments | Domain::CashCollections => false,
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Orders => write!(f, "orders"),
            Domain::StockItems => write!(f, "stock_items"),
            Domain::StockTakes => write!(f, "stock_takes"),
            Domain::PriceAdjustments => write!(f, "price_adjustments"),
            Domain::CashCollections => write!(f, "cash_collections"),
            Domain::InternalConsumptions => write!(f, "internal_consumptions"),
        }
    }
}

impl std::str::FromStr for Domain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "orders" => Ok(Domain::Orders),
            "stock_items" | "stockitems" => Ok(Domain::StockItems),
            "stock_takes" | "stocktakes" => Ok(Domain::StockTakes),
            "price_adjustments" | "priceadjustments" => Ok(Domain::PriceAdjustments),
            "cash_collections" | "cashcollections" => Ok(Domain::CashCollections),
            "internal_consumptions" | "internalconsumptions" => Ok(Domain::InternalConsumptions),
            other => Err(ValidationError::InvalidFormat {
                field: "domain".to_string(),
                reason: format!(
                    "unknown domain '{}'. Valid options: orders, stock_items, stock_takes, \
                     price_adjustments, cash_collections, internal_consumptions",
                    other
                ),
            }),
        }
    }
}
