//! # Remote Mutation Gateway
//!
//! A single shared client that executes one named remote write operation.
//!
//! ## Gateway Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Remote Mutation Gateway                              │
//! │                                                                         │
//! │  execute("createCashCollection", {amount, collected_at})               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  POST /graphql                                                         │
//! │  { "query": "mutation createCashCollection(...) {...}",                │
//! │    "variables": { "amount": "50.00", ... } }                           │
//! │       │                                                                 │
//! │       ├── transport error / timeout  → Err(Transport | Timeout)        │
//! │       ├── HTTP 4xx/5xx               → Err(Status)                     │
//! │       ├── body has "errors": [...]   → Err(Graphql)                    │
//! │       └── body has data.<operation>  → Ok(payload with server id)      │
//! │                                                                         │
//! │  ATOMICITY: one call either durably applied the write (success        │
//! │  payload) or did not (error). A TIMEOUT is the one ambiguous case -    │
//! │  the server may have applied the write after the client gave up. The  │
//! │  gateway surfaces it as a plain error; the duplicate-submission risk  │
//! │  is a documented tradeoff of the retry-then-retain design.            │
//! │                                                                         │
//! │  NO RETRIES HERE: pacing lives in the sync worker so backoff is       │
//! │  visible and testable at that layer.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::error::RemoteError;

// =============================================================================
// Gateway Trait
// =============================================================================

/// Executes one named remote write operation with the given variables.
///
/// Injected into each sync worker rather than imported ambiently, so tests
/// can script outcomes per call.
#[async_trait]
pub trait MutationGateway: Send + Sync {
    /// Executes the named mutation once. Never retries internally.
    ///
    /// On success, returns the operation's data payload, which contains at
    /// least the server-assigned identifier.
    async fn execute(&self, operation: &str, variables: Value) -> Result<Value, RemoteError>;
}

// =============================================================================
// Mutation Documents
// =============================================================================

/// Returns the GraphQL document for a named mutation.
///
/// One document per domain; the names here are the fixed wire contract and
/// must match [`relay_core::Domain::operation_name`].
pub fn mutation_document(operation: &str) -> Option<&'static str> {
    match operation {
        "placePosOrder" => Some(
            r#"mutation PlacePosOrder($input: PosOrderInputType!) {
  placePosOrder(input: $input) {
    order {
      id
      status
      subTotal
    }
  }
}"#,
        ),
        "addStock" => Some(
            r#"mutation AddStock($input: AddStockInput!) {
  addStock(input: $input) {
    stock {
      id
      product_id
      product_name
      qty
      selling_price
      created_at
    }
  }
}"#,
        ),
        "createStockTake" => Some(
            r#"mutation CreateStockTake($input: StockTakeInput!) {
  createStockTake(input: $input) {
    message
    stock {
      id
      product_id
      physical_count
      system_count
      reconciliation_difference
      taken_at
    }
  }
}"#,
        ),
        // Declares scalar variables but wraps them into the input object
        // inside the document itself.
        "createPriceAdjustment" => Some(
            r#"mutation CreatePriceAdjustment($product_id: ID!, $amount: String!, $created_at: String!, $new_price: String!, $old_price: String!, $product_name: String!, $sku: String!) {
  createPriceAdjustment(input: { product_id: $product_id, amount: $amount, created_at: $created_at, new_price: $new_price, old_price: $old_price, product_name: $product_name, sku: $sku }) {
    message
    price_adjustment {
      id
      product_id
      amount
      added_at
      product_name
      sku
      old_price
      new_price
    }
  }
}"#,
        ),
        "createCashCollection" => Some(
            r#"mutation createCashCollection($amount: String!, $collected_at: String!) {
  createCashCollection(amount: $amount, collected_at: $collected_at) {
    id
    amount
    collected_at
  }
}"#,
        ),
        "addInternalConsumption" => Some(
            r#"mutation AddInternalConsumption($input: AddInternalConsumptionInput!) {
  addInternalConsumption(input: $input) {
    consumption {
      id
      internal_consumption_name {
        id
        name
      }
      product_id
      product_name
      qty
      reason
      consumed_at
    }
    message
  }
}"#,
        ),
        _ => None,
    }
}

// =============================================================================
// GraphQL HTTP Gateway
// =============================================================================

/// Wire shape of a GraphQL response envelope.
#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,

    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
}

/// The production gateway: GraphQL mutations over HTTP POST.
#[derive(Debug, Clone)]
pub struct GraphqlGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl GraphqlGateway {
    /// Creates a gateway for the given endpoint.
    ///
    /// The request timeout bounds every attempt; an elapsed timeout is
    /// reported as [`RemoteError::Timeout`] and consumes one retry at the
    /// worker layer.
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(GraphqlGateway {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl MutationGateway for GraphqlGateway {
    async fn execute(&self, operation: &str, variables: Value) -> Result<Value, RemoteError> {
        let document = mutation_document(operation)
            .ok_or_else(|| RemoteError::UnknownOperation(operation.to_string()))?;

        debug!(operation = %operation, "Executing remote mutation");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "query": document,
                "variables": variables,
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Timeout
                } else {
                    RemoteError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                code: status.as_u16(),
            });
        }

        let body: GraphqlResponse = response.json().await.map_err(|e| {
            RemoteError::InvalidResponse {
                operation: operation.to_string(),
                detail: e.to_string(),
            }
        })?;

        extract_data(operation, body)
    }
}

/// Interprets a GraphQL envelope: errors win, then the operation's payload.
fn extract_data(operation: &str, body: GraphqlResponse) -> Result<Value, RemoteError> {
    if let Some(errors) = body.errors {
        if let Some(first) = errors.into_iter().next() {
            return Err(RemoteError::Graphql {
                operation: operation.to_string(),
                message: first.message,
            });
        }
    }

    let data = body.data.ok_or_else(|| RemoteError::InvalidResponse {
        operation: operation.to_string(),
        detail: "response has neither data nor errors".to_string(),
    })?;

    match data.get(operation) {
        Some(payload) if !payload.is_null() => Ok(payload.clone()),
        _ => Err(RemoteError::InvalidResponse {
            operation: operation.to_string(),
            detail: format!("data object is missing the '{operation}' field"),
        }),
    }
}
