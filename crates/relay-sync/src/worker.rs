//! # Generic Queued-Write Synchronizer
//!
//! One worker drains one domain queue against the remote gateway. All six
//! domains run the same engine; only the [`Domain`] parameter differs.
//!
//! ## Pass State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         One Sync Pass                                   │
//! │                                                                         │
//! │  Idle                                                                   │
//! │   │ trigger                                                             │
//! │   ▼                                                                     │
//! │  Gating ── not Connected ──────────────────────────▶ skip (Offline)     │
//! │   │ Connected                                                           │
//! │   ▼                                                                     │
//! │  Draining: snapshot = readAll(domain)                                   │
//! │   │   for each record, in order:                                        │
//! │   │     attempt 1 ── ok ──▶ drop from queue                             │
//! │   │     attempt 1 fails: sleep 1 × base                                 │
//! │   │     attempt 2 fails: sleep 2 × base                                 │
//! │   │     attempt 3 fails: RETAIN (next pass tries again)                 │
//! │   ▼                                                                     │
//! │  Committing: replaceAll(domain, retained)  ◀── the sole write-back      │
//! │                                                                         │
//! │  Gateway errors never abort the pass; every pass commits.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Known hazard, inherited from the commit protocol: a record appended by
//! the UI while a pass is draining is overwritten by the commit's full
//! replace. Callers that can enqueue concurrently should route appends
//! through the orchestrator's trigger instead of racing a running pass.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use relay_core::Domain;
use relay_store::{QueueRepository, StoreError};

use crate::config::RetryPolicy;
use crate::connectivity::ConnectivityMonitor;
use crate::error::SyncError;
use crate::gateway::MutationGateway;
use crate::report::{PassOutcome, PassReport};

// =============================================================================
// Sync Worker
// =============================================================================

/// Drains one domain's offline queue against the remote gateway.
pub struct SyncWorker {
    domain: Domain,
    queues: QueueRepository,
    gateway: Arc<dyn MutationGateway>,
    monitor: Arc<dyn ConnectivityMonitor>,
    retry: RetryPolicy,
}

impl SyncWorker {
    pub fn new(
        domain: Domain,
        queues: QueueRepository,
        gateway: Arc<dyn MutationGateway>,
        monitor: Arc<dyn ConnectivityMonitor>,
        retry: RetryPolicy,
    ) -> Self {
        SyncWorker {
            domain,
            queues,
            gateway,
            monitor,
            retry,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Runs one full sync pass: gate on connectivity, drain the snapshot,
    /// commit the retained set.
    ///
    /// Remote failures are absorbed into the report; only storage failures
    /// surface as errors, because a pass that cannot commit has no safe
    /// outcome.
    pub async fn run_pass(&self) -> Result<PassReport, SyncError> {
        if !self.monitor.current().await.is_connected() {
            debug!(domain = %self.domain, "Skipping sync pass, not connected");
            return Ok(PassReport::skipped(self.domain, PassOutcome::Offline));
        }

        let key = self.domain.storage_key();
        let snapshot = match self.queues.read_all(key).await {
            Ok(records) => records,
            Err(StoreError::Corrupt { detail, .. }) => {
                // A wedged queue would block the domain forever; reset it
                // and surface the loss loudly.
                error!(
                    domain = %self.domain,
                    detail = %detail,
                    "Queue payload is corrupt, resetting to empty"
                );
                self.queues.replace_all(key, &[]).await?;
                return Ok(PassReport::skipped(self.domain, PassOutcome::CorruptReset));
            }
            Err(e) => return Err(e.into()),
        };

        if snapshot.is_empty() {
            // Idempotent empty write-back: draining ran, so committing runs.
            self.queues.replace_all(key, &[]).await?;
            return Ok(PassReport::skipped(self.domain, PassOutcome::EmptyQueue));
        }

        info!(
            domain = %self.domain,
            pending = snapshot.len(),
            "Starting sync pass"
        );

        let mut retained = Vec::new();
        let mut synced = 0usize;
        let mut gateway_calls = 0usize;

        // Strictly sequential: one in-flight mutation per pass, original
        // order preserved for retained records.
        for record in snapshot {
            let variables = self.variables_for(&record);
            let (succeeded, calls) = self.push_record(variables).await;
            gateway_calls += calls;
            if succeeded {
                synced += 1;
            } else {
                retained.push(record);
            }
        }

        // The sole write-back. Commits exactly the records not confirmed
        // successful in this pass.
        self.queues.replace_all(key, &retained).await?;

        let outcome = if retained.is_empty() {
            PassOutcome::Drained
        } else {
            PassOutcome::PartiallyDrained
        };

        info!(
            domain = %self.domain,
            synced,
            retained = retained.len(),
            gateway_calls,
            "Sync pass complete"
        );

        Ok(PassReport {
            domain: self.domain,
            outcome,
            synced,
            retained: retained.len(),
            gateway_calls,
        })
    }

    /// Builds the mutation variables for one queued record.
    ///
    /// Most domains wrap the record as `{ "input": record }`; price
    /// adjustments and cash collections spread their fields as top-level
    /// variables, so the record object is the variables object.
    fn variables_for(&self, record: &Value) -> Value {
        if self.domain.wraps_input() {
            json!({ "input": record })
        } else {
            record.clone()
        }
    }

    /// Pushes one record with bounded retries.
    ///
    /// Returns whether the remote accepted it and how many gateway calls
    /// were made. A failed record consumes exactly `max_attempts` calls
    /// with linearly growing delay between them.
    async fn push_record(&self, variables: Value) -> (bool, usize) {
        let operation = self.domain.operation_name();
        let mut attempts = 0u32;

        while attempts < self.retry.max_attempts {
            match self.gateway.execute(operation, variables.clone()).await {
                Ok(payload) => {
                    // Fully qualified: inside the macro expansion a bare
                    // `Value` resolves to the tracing::Value trait.
                    debug!(
                        domain = %self.domain,
                        id = %payload.get("id").and_then(serde_json::Value::as_str).unwrap_or("-"),
                        "Record accepted by remote"
                    );
                    return (true, attempts as usize + 1);
                }
                Err(err) => {
                    attempts += 1;
                    warn!(
                        domain = %self.domain,
                        attempt = attempts,
                        max = self.retry.max_attempts,
                        retryable = err.is_retryable(),
                        error = %err,
                        "Remote mutation failed"
                    );
                    if attempts < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.delay_after(attempts)).await;
                    }
                }
            }
        }

        (false, attempts as usize)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::{ConnectivityState, ManualMonitor};
    use crate::error::RemoteError;
    use async_trait::async_trait;
    use relay_store::QueueStore;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Scripted gateway: pops one result per call, records call metadata.
    struct ScriptedGateway {
        script: Mutex<Vec<Result<Value, RemoteError>>>,
        calls: Mutex<Vec<(String, Value, Instant)>>,
    }

    impl ScriptedGateway {
        fn new(script: Vec<Result<Value, RemoteError>>) -> Self {
            ScriptedGateway {
                script: Mutex::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn always_ok() -> Self {
            ScriptedGateway::new(Vec::new())
        }

        fn calls(&self) -> Vec<(String, Value, Instant)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MutationGateway for ScriptedGateway {
        async fn execute(&self, operation: &str, variables: Value) -> Result<Value, RemoteError> {
            self.calls
                .lock()
                .unwrap()
                .push((operation.to_string(), variables, Instant::now()));
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                Ok(json!({ "id": "srv-1" }))
            } else {
                script.remove(0)
            }
        }
    }

    async fn worker_with(
        domain: Domain,
        gateway: Arc<ScriptedGateway>,
        state: ConnectivityState,
    ) -> (SyncWorker, QueueStore) {
        let store = QueueStore::in_memory().await.unwrap();
        let monitor = Arc::new(ManualMonitor::new(state));
        let worker = SyncWorker::new(
            domain,
            store.queues(),
            gateway,
            monitor,
            RetryPolicy::default(),
        );
        (worker, store)
    }

    #[tokio::test]
    async fn test_empty_queue_makes_no_gateway_calls() {
        let gateway = Arc::new(ScriptedGateway::always_ok());
        let (worker, store) =
            worker_with(Domain::Orders, gateway.clone(), ConnectivityState::Connected).await;

        let report = worker.run_pass().await.unwrap();
        assert_eq!(report.outcome, PassOutcome::EmptyQueue);
        assert!(gateway.calls().is_empty());
        assert_eq!(
            store.queues().count(Domain::Orders.storage_key()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_offline_pass_touches_nothing() {
        let gateway = Arc::new(ScriptedGateway::always_ok());
        let (worker, store) = worker_with(
            Domain::CashCollections,
            gateway.clone(),
            ConnectivityState::Disconnected,
        )
        .await;

        let key = Domain::CashCollections.storage_key();
        store
            .queues()
            .append(key, &json!({ "amount": "50.00", "collected_at": "2024-01-01" }))
            .await
            .unwrap();

        let report = worker.run_pass().await.unwrap();
        assert_eq!(report.outcome, PassOutcome::Offline);
        assert!(gateway.calls().is_empty());
        assert_eq!(store.queues().count(key).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_connectivity_is_treated_as_offline() {
        let gateway = Arc::new(ScriptedGateway::always_ok());
        let (worker, _store) =
            worker_with(Domain::Orders, gateway.clone(), ConnectivityState::Unknown).await;

        let report = worker.run_pass().await.unwrap();
        assert_eq!(report.outcome, PassOutcome::Offline);
    }

    #[tokio::test]
    async fn test_drained_pass_clears_the_queue() {
        let gateway = Arc::new(ScriptedGateway::always_ok());
        let (worker, store) =
            worker_with(Domain::Orders, gateway.clone(), ConnectivityState::Connected).await;

        let key = Domain::Orders.storage_key();
        let queues = store.queues();
        queues
            .append(key, &json!({ "items": [{ "productId": "1", "quantity": 2, "price": "9.99" }] }))
            .await
            .unwrap();
        queues
            .append(key, &json!({ "items": [{ "productId": "2", "quantity": 1, "price": "4.00" }] }))
            .await
            .unwrap();

        let report = worker.run_pass().await.unwrap();
        assert_eq!(report.outcome, PassOutcome::Drained);
        assert_eq!(report.synced, 2);
        assert_eq!(report.retained, 0);
        assert_eq!(report.gateway_calls, 2);
        assert_eq!(queues.count(key).await.unwrap(), 0);

        // Orders wrap the record under "input".
        let calls = gateway.calls();
        assert_eq!(calls[0].0, "placePosOrder");
        assert!(calls[0].1.get("input").is_some());
    }

    #[tokio::test]
    async fn test_spread_domains_send_fields_as_top_level_variables() {
        let gateway = Arc::new(ScriptedGateway::always_ok());
        let (worker, store) = worker_with(
            Domain::CashCollections,
            gateway.clone(),
            ConnectivityState::Connected,
        )
        .await;

        let key = Domain::CashCollections.storage_key();
        store
            .queues()
            .append(key, &json!({ "amount": "50.00", "collected_at": "2024-01-01" }))
            .await
            .unwrap();

        worker.run_pass().await.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls[0].0, "createCashCollection");
        assert_eq!(calls[0].1["amount"], "50.00");
        assert!(calls[0].1.get("input").is_none());
    }

    #[tokio::test]
    async fn test_exhausted_record_is_retained_after_three_attempts() {
        // Record 1 succeeds, record 2 fails all three attempts.
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Ok(json!({ "id": "42" })),
            Err(RemoteError::Timeout),
            Err(RemoteError::Timeout),
            Err(RemoteError::Timeout),
        ]));
        let (worker, store) = worker_with(
            Domain::CashCollections,
            gateway.clone(),
            ConnectivityState::Connected,
        )
        .await;

        let key = Domain::CashCollections.storage_key();
        let queues = store.queues();
        queues
            .append(key, &json!({ "amount": "50.00", "collected_at": "2024-01-01" }))
            .await
            .unwrap();
        queues
            .append(key, &json!({ "amount": "30.00", "collected_at": "2024-01-02" }))
            .await
            .unwrap();

        let report = worker.run_pass().await.unwrap();
        assert_eq!(report.outcome, PassOutcome::PartiallyDrained);
        assert_eq!(report.synced, 1);
        assert_eq!(report.retained, 1);
        assert_eq!(report.gateway_calls, 4);

        // Exactly the failed record survives, order intact.
        let remaining = queues.read_all(key).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["amount"], "30.00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_grow_linearly() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(RemoteError::Transport("connection refused".into())),
            Err(RemoteError::Transport("connection refused".into())),
            Err(RemoteError::Transport("connection refused".into())),
        ]));
        let (worker, store) = worker_with(
            Domain::StockItems,
            gateway.clone(),
            ConnectivityState::Connected,
        )
        .await;

        store
            .queues()
            .append(
                Domain::StockItems.storage_key(),
                &json!({ "product_id": "p1", "qty": "5", "selling_price": "2.50" }),
            )
            .await
            .unwrap();

        worker.run_pass().await.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 3);
        // 1 × base after the first failure, 2 × base after the second.
        let base = RetryPolicy::default().delay_after(1);
        assert_eq!(calls[1].2 - calls[0].2, base);
        assert_eq!(calls[2].2 - calls[1].2, base * 2);
    }

    #[tokio::test]
    async fn test_corrupt_queue_is_reset_instead_of_wedging() {
        let gateway = Arc::new(ScriptedGateway::always_ok());
        let (worker, store) =
            worker_with(Domain::StockTakes, gateway.clone(), ConnectivityState::Connected).await;

        let key = Domain::StockTakes.storage_key();
        sqlx::query("INSERT INTO offline_queue (queue_key, payload) VALUES (?1, ?2)")
            .bind(key)
            .bind("{not json")
            .execute(store.pool())
            .await
            .unwrap();

        let report = worker.run_pass().await.unwrap();
        assert_eq!(report.outcome, PassOutcome::CorruptReset);
        assert!(gateway.calls().is_empty());
        assert_eq!(store.queues().count(key).await.unwrap(), 0);
    }
}
