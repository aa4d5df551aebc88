//! # Validation Module
//!
//! Capture-time validation for queued records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Capture UI (TypeScript)                                      │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before enqueue)                                 │
//! │  ├── Required fields present and non-empty                             │
//! │  ├── Amounts parse as decimals, quantities positive                    │
//! │  └── Timestamps well-formed                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote schema (GraphQL)                                      │
//! │  └── Final authority - but a record that fails THERE is retried        │
//! │      forever, so catching bad input before enqueue matters.            │
//! │                                                                         │
//! │  Capture-time failures surface immediately; sync failures stay         │
//! │  silent. Validation is the last point where the user can fix input.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate};

use crate::error::ValidationError;
use crate::records::{
    CashCollectionInput, InternalConsumptionInput, OrderInput, PriceAdjustmentInput,
    StockItemInput, StockTakeInput,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that a required string field is present and non-empty.
pub fn validate_required(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a monetary amount: non-empty and a non-negative decimal.
///
/// ## Example
/// ```rust
/// use relay_core::validation::validate_amount;
///
/// assert!(validate_amount("amount", "50.00").is_ok());
/// assert!(validate_amount("amount", "fifty").is_err());
/// assert!(validate_amount("amount", "-1.00").is_err());
/// ```
pub fn validate_amount(field: &'static str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;

    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => Ok(()),
        Ok(_) => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a non-negative amount".to_string(),
        }),
        Err(_) => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a decimal number".to_string(),
        }),
    }
}

/// Validates a quantity carried as a string scalar: a positive integer.
pub fn validate_quantity(field: &'static str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;

    match value.trim().parse::<i64>() {
        Ok(parsed) if parsed > 0 => Ok(()),
        Ok(parsed) => Err(ValidationError::NotPositive {
            field: field.to_string(),
            value: parsed.to_string(),
        }),
        Err(_) => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a whole number".to_string(),
        }),
    }
}

/// Validates a count field: a non-negative integer (zero is a valid count
/// for stock takes).
pub fn validate_count(field: &'static str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;

    match value.trim().parse::<i64>() {
        Ok(parsed) if parsed >= 0 => Ok(()),
        Ok(parsed) => Err(ValidationError::NotPositive {
            field: field.to_string(),
            value: parsed.to_string(),
        }),
        Err(_) => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a whole number".to_string(),
        }),
    }
}

/// Validates an ISO-8601 timestamp (RFC 3339 form, as produced by the
/// capture UI's `toISOString()`).
pub fn validate_timestamp(field: &'static str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;

    DateTime::parse_from_rfc3339(value.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be an ISO-8601 timestamp".to_string(),
    })?;
    Ok(())
}

/// Validates a plain date in yyyy-mm-dd form.
pub fn validate_date(field: &'static str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;

    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a yyyy-mm-dd date".to_string(),
        }
    })?;
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a POS order before it enters the queue.
pub fn validate_order(order: &OrderInput) -> ValidationResult<()> {
    if order.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    for line in &order.items {
        validate_required("productId", &line.product_id)?;
        validate_amount("price", &line.price)?;
        if line.quantity == 0 {
            return Err(ValidationError::NotPositive {
                field: "quantity".to_string(),
                value: "0".to_string(),
            });
        }
    }
    Ok(())
}

/// Validates a stock addition before it enters the queue.
pub fn validate_stock_item(stock: &StockItemInput) -> ValidationResult<()> {
    validate_required("product_id", &stock.product_id)?;
    validate_quantity("qty", &stock.qty)?;
    validate_amount("selling_price", &stock.selling_price)?;
    Ok(())
}

/// Validates a stock take before it enters the queue.
pub fn validate_stock_take(take: &StockTakeInput) -> ValidationResult<()> {
    validate_required("product_id", &take.product_id)?;
    validate_count("physical_count", &take.physical_count)?;
    validate_count("system_count", &take.system_count)?;
    validate_timestamp("taken_at", &take.taken_at)?;
    Ok(())
}

/// Validates a price adjustment before it enters the queue.
pub fn validate_price_adjustment(adjustment: &PriceAdjustmentInput) -> ValidationResult<()> {
    validate_required("product_id", &adjustment.product_id)?;
    validate_required("product_name", &adjustment.product_name)?;
    validate_required("sku", &adjustment.sku)?;
    validate_amount("amount", &adjustment.amount)?;
    validate_amount("old_price", &adjustment.old_price)?;
    validate_amount("new_price", &adjustment.new_price)?;
    validate_timestamp("created_at", &adjustment.created_at)?;
    Ok(())
}

/// Validates a cash collection before it enters the queue.
pub fn validate_cash_collection(collection: &CashCollectionInput) -> ValidationResult<()> {
    validate_amount("amount", &collection.amount)?;
    validate_date("collected_at", &collection.collected_at)?;
    Ok(())
}

/// Validates an internal consumption record before it enters the queue.
pub fn validate_internal_consumption(
    consumption: &InternalConsumptionInput,
) -> ValidationResult<()> {
    validate_required(
        "internal_consumption_name_id",
        &consumption.internal_consumption_name_id,
    )?;
    validate_required("product_id", &consumption.product_id)?;
    validate_required("product_name", &consumption.product_name)?;
    validate_quantity("qty", &consumption.qty)?;
    validate_required("reason", &consumption.reason)?;
    validate_timestamp("consumed_at", &consumption.consumed_at)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::OrderLine;

    fn valid_order() -> OrderInput {
        OrderInput {
            items: vec![OrderLine {
                product_id: "42".into(),
                quantity: 2,
                price: "3.50".into(),
            }],
        }
    }

    #[test]
    fn test_validate_order() {
        assert!(validate_order(&valid_order()).is_ok());

        let empty = OrderInput { items: vec![] };
        assert_eq!(
            validate_order(&empty),
            Err(ValidationError::Empty {
                field: "items".into()
            })
        );

        let mut zero_qty = valid_order();
        zero_qty.items[0].quantity = 0;
        assert!(validate_order(&zero_qty).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("amount", "50.00").is_ok());
        assert!(validate_amount("amount", "0").is_ok());
        assert!(validate_amount("amount", "").is_err());
        assert!(validate_amount("amount", "abc").is_err());
        assert!(validate_amount("amount", "-1").is_err());
        assert!(validate_amount("amount", "NaN").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("qty", "3").is_ok());
        assert!(validate_quantity("qty", "0").is_err());
        assert!(validate_quantity("qty", "-2").is_err());
        assert!(validate_quantity("qty", "2.5").is_err());
    }

    #[test]
    fn test_validate_cash_collection() {
        let collection = CashCollectionInput {
            amount: "50.00".into(),
            collected_at: "2024-01-01".into(),
        };
        assert!(validate_cash_collection(&collection).is_ok());

        let bad_date = CashCollectionInput {
            amount: "50.00".into(),
            collected_at: "January 1st".into(),
        };
        assert!(validate_cash_collection(&bad_date).is_err());
    }

    #[test]
    fn test_validate_stock_take_counts() {
        let take = StockTakeInput {
            product_id: "7".into(),
            physical_count: "0".into(),
            system_count: "12".into(),
            taken_at: "2024-03-01T09:30:00.000Z".into(),
        };
        // Zero is a legitimate physical count.
        assert!(validate_stock_take(&take).is_ok());
    }

    #[test]
    fn test_validate_internal_consumption_requires_reason() {
        let consumption = InternalConsumptionInput {
            internal_consumption_name_id: "3".into(),
            product_id: "7".into(),
            product_name: "Coca-Cola 330ml".into(),
            qty: "1".into(),
            reason: "  ".into(),
            consumed_at: "2024-03-01T09:30:00.000Z".into(),
        };
        assert_eq!(
            validate_internal_consumption(&consumption),
            Err(ValidationError::Required {
                field: "reason".into()
            })
        );
    }
}
