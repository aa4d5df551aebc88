//! # Queue Repository
//!
//! The three-operation contract of the Durable Queue Store.
//!
//! ## Whole-Sequence Mutation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Queue Mutation Contract                              │
//! │                                                                         │
//! │  append(key, record)                                                   │
//! │  ├── BEGIN                                                             │
//! │  ├── SELECT payload FROM offline_queue WHERE queue_key = ?             │
//! │  ├── decode array, push record at the end                              │
//! │  ├── UPSERT the whole array                                            │
//! │  └── COMMIT  ← durable before append() returns                         │
//! │                                                                         │
//! │  read_all(key)                                                         │
//! │  ├── missing row          → empty vec (never an error)                 │
//! │  ├── payload not an array → StoreError::Corrupt                        │
//! │  └── otherwise            → records, oldest first                      │
//! │                                                                         │
//! │  replace_all(key, records)                                             │
//! │  └── single UPSERT ← the sync pass commit; atomic full overwrite       │
//! │                                                                         │
//! │  There is deliberately NO per-record delete: the sync worker commits   │
//! │  by writing back exactly the records it retained.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Repository for the per-domain offline queues.
#[derive(Debug, Clone)]
pub struct QueueRepository {
    pool: SqlitePool,
}

impl QueueRepository {
    /// Creates a new QueueRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QueueRepository { pool }
    }

    /// Appends one record to the end of the queue.
    ///
    /// Runs in a transaction so a concurrent append cannot drop the record;
    /// the write is durable before this returns.
    ///
    /// Returns [`StoreError::Corrupt`] without modifying anything if the
    /// existing payload cannot be decoded - appending to a corrupt queue
    /// would silently bless the corruption.
    pub async fn append<T: Serialize>(&self, queue_key: &str, record: &T) -> StoreResult<()> {
        let record = serde_json::to_value(record)?;

        let mut tx = self.pool.begin().await?;

        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM offline_queue WHERE queue_key = ?1")
                .bind(queue_key)
                .fetch_optional(&mut *tx)
                .await?;

        let mut records = match payload {
            None => Vec::new(),
            Some(raw) => decode_payload(queue_key, &raw)?,
        };
        records.push(record);

        upsert(&mut tx, queue_key, &records).await?;
        tx.commit().await?;

        debug!(queue_key = %queue_key, pending = records.len(), "Appended record to queue");
        Ok(())
    }

    /// Returns the current persisted sequence, oldest record first.
    ///
    /// A missing row is an empty queue, never an error.
    pub async fn read_all(&self, queue_key: &str) -> StoreResult<Vec<Value>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM offline_queue WHERE queue_key = ?1")
                .bind(queue_key)
                .fetch_optional(&self.pool)
                .await?;

        match payload {
            None => Ok(Vec::new()),
            Some(raw) => decode_payload(queue_key, &raw),
        }
    }

    /// Atomically overwrites the persisted sequence.
    ///
    /// This is the sync pass commit: the caller passes exactly the records
    /// not confirmed successful, and nothing else survives.
    pub async fn replace_all(&self, queue_key: &str, records: &[Value]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        upsert(&mut tx, queue_key, records).await?;
        tx.commit().await?;

        debug!(queue_key = %queue_key, pending = records.len(), "Replaced queue contents");
        Ok(())
    }

    /// Counts pending records in the queue (for status surfaces).
    pub async fn count(&self, queue_key: &str) -> StoreResult<usize> {
        Ok(self.read_all(queue_key).await?.len())
    }
}

/// Decodes a persisted payload, requiring a JSON array.
fn decode_payload(queue_key: &str, raw: &str) -> StoreResult<Vec<Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(records)) => Ok(records),
        Ok(other) => Err(StoreError::Corrupt {
            queue_key: queue_key.to_string(),
            detail: format!("expected a JSON array, found {}", json_kind(&other)),
        }),
        Err(e) => Err(StoreError::Corrupt {
            queue_key: queue_key.to_string(),
            detail: e.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Upserts the whole queue payload for a key.
async fn upsert(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    queue_key: &str,
    records: &[Value],
) -> StoreResult<()> {
    let payload = serde_json::to_string(records)?;

    sqlx::query(
        r#"
        INSERT INTO offline_queue (queue_key, payload, updated_at)
        VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        ON CONFLICT(queue_key) DO UPDATE SET
            payload = excluded.payload,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(queue_key)
    .bind(payload)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::QueueStore;
    use relay_core::{CashCollectionInput, Domain};
    use serde_json::json;

    async fn store() -> QueueStore {
        QueueStore::in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_read_all_missing_queue_is_empty() {
        let store = store().await;
        let records = store
            .queues()
            .read_all(Domain::Orders.storage_key())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_append_then_read_contains_record_last() {
        let store = store().await;
        let queues = store.queues();
        let key = Domain::CashCollections.storage_key();

        queues
            .append(key, &json!({"amount": "50.00", "collected_at": "2024-01-01"}))
            .await
            .unwrap();
        queues
            .append(key, &json!({"amount": "30.00", "collected_at": "2024-01-02"}))
            .await
            .unwrap();

        let records = queues.read_all(key).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["amount"], "30.00");
    }

    #[tokio::test]
    async fn test_append_accepts_typed_records() {
        let store = store().await;
        let queues = store.queues();
        let key = Domain::CashCollections.storage_key();

        let collection = CashCollectionInput {
            amount: "12.00".into(),
            collected_at: "2024-02-01".into(),
        };
        queues.append(key, &collection).await.unwrap();

        let records = queues.read_all(key).await.unwrap();
        assert_eq!(records[0]["amount"], "12.00");
    }

    #[tokio::test]
    async fn test_replace_all_overwrites_whole_sequence() {
        let store = store().await;
        let queues = store.queues();
        let key = Domain::StockItems.storage_key();

        queues.append(key, &json!({"product_id": "1"})).await.unwrap();
        queues.append(key, &json!({"product_id": "2"})).await.unwrap();

        queues
            .replace_all(key, &[json!({"product_id": "2"})])
            .await
            .unwrap();

        let records = queues.read_all(key).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["product_id"], "2");

        // Replace with empty commits an empty queue, not a missing row.
        queues.replace_all(key, &[]).await.unwrap();
        assert!(queues.read_all(key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_queues_are_isolated_per_key() {
        let store = store().await;
        let queues = store.queues();

        queues
            .append(Domain::Orders.storage_key(), &json!({"items": []}))
            .await
            .unwrap();

        assert_eq!(queues.count(Domain::Orders.storage_key()).await.unwrap(), 1);
        assert_eq!(
            queues.count(Domain::StockTakes.storage_key()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_reported_not_swallowed() {
        let store = store().await;
        let queues = store.queues();
        let key = Domain::Orders.storage_key();

        sqlx::query("INSERT INTO offline_queue (queue_key, payload) VALUES (?1, ?2)")
            .bind(key)
            .bind("definitely-not-json")
            .execute(store.pool())
            .await
            .unwrap();

        let err = queues.read_all(key).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));

        // Appending to a corrupt queue must not bless the corruption.
        let err = queues.append(key, &json!({"items": []})).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_non_array_payload_is_corrupt() {
        let store = store().await;
        let queues = store.queues();
        let key = Domain::StockTakes.storage_key();

        sqlx::query("INSERT INTO offline_queue (queue_key, payload) VALUES (?1, ?2)")
            .bind(key)
            .bind(r#"{"not": "an array"}"#)
            .execute(store.pool())
            .await
            .unwrap();

        let err = queues.read_all(key).await.unwrap_err();
        match err {
            StoreError::Corrupt { detail, .. } => assert!(detail.contains("an object")),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }
}
