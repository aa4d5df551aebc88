//! # Queued Record Types
//!
//! One struct per domain, field-for-field on the remote wire contract.
//!
//! ## Wire Fidelity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Record Shape Rules                                  │
//! │                                                                         │
//! │  • Field names serialize exactly as the remote mutation expects        │
//! │    (snake_case for most domains, camelCase for order lines).           │
//! │  • Monetary amounts and quantities are STRINGS on the wire - the       │
//! │    remote schema declares them as String scalars, and re-encoding      │
//! │    them as numbers would change what the server receives.              │
//! │  • Timestamps are ISO-8601 strings; cash collections use a plain       │
//! │    yyyy-mm-dd date.                                                    │
//! │  • No client-generated identifier: identity is assigned by the         │
//! │    remote system on successful write.                                  │
//! │                                                                         │
//! │  A queued record is persisted exactly as captured and replayed         │
//! │  exactly as persisted. Serde round-trips must be lossless.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Orders
// =============================================================================

/// One line of a POS order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLine {
    /// Remote product identifier.
    pub product_id: String,

    /// Units ordered.
    pub quantity: u32,

    /// Unit price at capture time (string scalar on the wire).
    pub price: String,
}

/// A POS order captured at the till.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderInput {
    /// Order lines; at least one is required.
    pub items: Vec<OrderLine>,
}

// =============================================================================
// Stock Items
// =============================================================================

/// A stock addition (goods received into inventory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockItemInput {
    /// Remote product identifier.
    pub product_id: String,

    /// Quantity received (string scalar on the wire).
    pub qty: String,

    /// Selling price for the received stock.
    pub selling_price: String,
}

// =============================================================================
// Stock Takes
// =============================================================================

/// A stock take: physical count reconciled against the system count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockTakeInput {
    /// Remote product identifier.
    pub product_id: String,

    /// Units physically counted.
    pub physical_count: String,

    /// Units the system believed were on hand at capture time.
    pub system_count: String,

    /// ISO-8601 capture timestamp.
    pub taken_at: String,
}

// =============================================================================
// Price Adjustments
// =============================================================================

/// A selling-price adjustment.
///
/// Carries the denormalized product name and SKU so the remote side can
/// record the adjustment even if the product is later renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceAdjustmentInput {
    /// Remote product identifier.
    pub product_id: String,

    /// Product name at capture time.
    pub product_name: String,

    /// Product SKU at capture time.
    pub sku: String,

    /// Adjustment amount.
    pub amount: String,

    /// Price before the adjustment.
    pub old_price: String,

    /// Price after the adjustment.
    pub new_price: String,

    /// ISO-8601 capture timestamp.
    pub created_at: String,
}

// =============================================================================
// Cash Collections
// =============================================================================

/// Cash collected from the till.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashCollectionInput {
    /// Amount collected, two decimal places.
    pub amount: String,

    /// Collection date, yyyy-mm-dd.
    pub collected_at: String,
}

// =============================================================================
// Internal Consumptions
// =============================================================================

/// Stock consumed internally rather than sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InternalConsumptionInput {
    /// Identifier of the consumer (staff member / cost centre).
    pub internal_consumption_name_id: String,

    /// Remote product identifier.
    pub product_id: String,

    /// Product name at capture time.
    pub product_name: String,

    /// Units consumed (string scalar on the wire).
    pub qty: String,

    /// Free-text reason for the consumption.
    pub reason: String,

    /// ISO-8601 capture timestamp.
    pub consumed_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_line_serializes_camel_case() {
        let line = OrderLine {
            product_id: "42".into(),
            quantity: 2,
            price: "3.50".into(),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["productId"], "42");
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["price"], "3.50");
    }

    #[test]
    fn test_cash_collection_serializes_snake_case() {
        let collection = CashCollectionInput {
            amount: "50.00".into(),
            collected_at: "2024-01-01".into(),
        };
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["amount"], "50.00");
        assert_eq!(json["collected_at"], "2024-01-01");
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let adjustment = PriceAdjustmentInput {
            product_id: "7".into(),
            product_name: "Coca-Cola 330ml".into(),
            sku: "COKE-330".into(),
            amount: "0.25".into(),
            old_price: "1.00".into(),
            new_price: "1.25".into(),
            created_at: "2024-03-01T09:30:00.000Z".into(),
        };
        let json = serde_json::to_string(&adjustment).unwrap();
        let back: PriceAdjustmentInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, adjustment);
    }

    #[test]
    fn test_unknown_fields_are_rejected_nowhere() {
        // Queued payloads written by older app builds may carry extra fields;
        // deserialization must tolerate them rather than drop the record.
        let json = r#"{"amount":"10.00","collected_at":"2024-01-01","legacy_id":123}"#;
        let collection: CashCollectionInput = serde_json::from_str(json).unwrap();
        assert_eq!(collection.amount, "10.00");
    }
}
