//! # Sync Orchestrator
//!
//! Owns the six domain workers and decides when each one runs a pass.
//!
//! ## Trigger Topology
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Sync Orchestrator                              │
//! │                                                                         │
//! │  TRIGGER SOURCES                        PER-DOMAIN RUNNERS              │
//! │  ┌───────────────────┐                                                  │
//! │  │ Startup           │──┐    ┌──────────────────┐   ┌───────────────┐  │
//! │  ├───────────────────┤  │    │ mpsc(capacity 1) │──▶│ orders runner │  │
//! │  │ Connectivity      │──┼──▶ ├──────────────────┤   ├───────────────┤  │
//! │  │ regained          │  │    │ mpsc(capacity 1) │──▶│ stock runner  │  │
//! │  ├───────────────────┤  │    ├──────────────────┤   ├───────────────┤  │
//! │  │ Periodic timer    │──┘    │       ...        │──▶│      ...      │  │
//! │  │ (orders, 60s)     │       └──────────────────┘   └───────────────┘  │
//! │  └───────────────────┘                                                  │
//! │                                                                         │
//! │  OVERLAP RULE: each runner executes passes inline in its own task, so  │
//! │  two passes on the same domain can never overlap. The capacity-1       │
//! │  trigger channel gives queued-once semantics: a trigger arriving       │
//! │  mid-pass parks until the pass ends; further triggers are dropped.     │
//! │                                                                         │
//! │  Every completed pass is published on the report channel.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use relay_core::Domain;
use relay_store::QueueStore;

use crate::config::SyncConfig;
use crate::connectivity::{ConnectivityMonitor, ProbeConfig, ProbeMonitor};
use crate::error::SyncResult;
use crate::gateway::{GraphqlGateway, MutationGateway};
use crate::report::PassReport;
use crate::worker::SyncWorker;

// =============================================================================
// Triggers
// =============================================================================

/// What caused a sync pass to be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Engine startup drains whatever accumulated while the app was closed.
    Startup,

    /// Connectivity transitioned from not-connected to connected.
    ConnectivityRegained,

    /// A domain's periodic timer fired.
    Periodic,

    /// Explicit request, e.g. right after the UI enqueued a record.
    Manual,
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerReason::Startup => write!(f, "startup"),
            TriggerReason::ConnectivityRegained => write!(f, "connectivity_regained"),
            TriggerReason::Periodic => write!(f, "periodic"),
            TriggerReason::Manual => write!(f, "manual"),
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Assembles the six workers and their trigger plumbing.
pub struct SyncEngine {
    store: QueueStore,
    gateway: Arc<dyn MutationGateway>,
    monitor: Arc<dyn ConnectivityMonitor>,
    config: SyncConfig,
}

/// Running engine: trigger injection and shutdown.
pub struct EngineHandle {
    triggers: HashMap<Domain, mpsc::Sender<TriggerReason>>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SyncEngine {
    pub fn new(
        store: QueueStore,
        gateway: Arc<dyn MutationGateway>,
        monitor: Arc<dyn ConnectivityMonitor>,
        config: SyncConfig,
    ) -> Self {
        SyncEngine {
            store,
            gateway,
            monitor,
            config,
        }
    }

    /// Builds the production wiring from configuration: a GraphQL gateway
    /// for the configured endpoint and a TCP probe monitor against its host.
    ///
    /// Must be called from within a tokio runtime; the probe task starts
    /// immediately.
    pub fn from_config(store: QueueStore, config: SyncConfig) -> SyncResult<Self> {
        config.validate()?;

        let gateway =
            GraphqlGateway::new(config.gateway.endpoint.clone(), config.request_timeout())?;
        let probe = ProbeConfig::from_endpoint(
            &config.gateway.endpoint,
            config.probe_interval(),
            config.probe_timeout(),
        )?;
        let monitor = ProbeMonitor::spawn(probe);

        Ok(SyncEngine::new(
            store,
            Arc::new(gateway),
            Arc::new(monitor),
            config,
        ))
    }

    /// Starts one runner task per domain, the connectivity watcher, and the
    /// periodic timers, then fires the startup trigger for every domain.
    ///
    /// The returned receiver yields one [`PassReport`] per completed pass.
    pub fn spawn(self) -> (EngineHandle, mpsc::UnboundedReceiver<PassReport>) {
        let (shutdown_tx, _) = watch::channel(false);
        let (report_tx, report_rx) = mpsc::unbounded_channel();

        let mut triggers = HashMap::new();
        let mut tasks = Vec::new();

        for domain in Domain::ALL {
            // Capacity 1: at most one pending trigger while a pass runs.
            let (trigger_tx, trigger_rx) = mpsc::channel(1);
            triggers.insert(domain, trigger_tx);

            let worker = SyncWorker::new(
                domain,
                self.store.queues(),
                Arc::clone(&self.gateway),
                Arc::clone(&self.monitor),
                self.config.retry.clone(),
            );
            tasks.push(tokio::spawn(run_domain(
                worker,
                trigger_rx,
                shutdown_tx.subscribe(),
                report_tx.clone(),
            )));
        }

        tasks.push(tokio::spawn(watch_connectivity(
            self.monitor.subscribe(),
            triggers.clone(),
            shutdown_tx.subscribe(),
        )));

        for domain in Domain::ALL {
            if let Some(interval) = self.config.schedule.interval_for(domain) {
                tasks.push(tokio::spawn(run_periodic(
                    domain,
                    interval,
                    triggers[&domain].clone(),
                    shutdown_tx.subscribe(),
                )));
            }
        }

        let handle = EngineHandle {
            triggers,
            shutdown_tx,
            tasks,
        };

        info!("Sync engine started, draining startup backlog");
        handle.trigger_all(TriggerReason::Startup);

        (handle, report_rx)
    }
}

impl EngineHandle {
    /// Requests a pass for one domain.
    ///
    /// Returns `true` if the trigger was accepted, `false` if a trigger was
    /// already queued behind a running pass and this one was dropped.
    pub fn trigger(&self, domain: Domain, reason: TriggerReason) -> bool {
        match self.triggers[&domain].try_send(reason) {
            Ok(()) => true,
            Err(_) => {
                debug!(domain = %domain, reason = %reason, "Trigger dropped, pass already queued");
                false
            }
        }
    }

    /// Requests a pass for every domain.
    pub fn trigger_all(&self, reason: TriggerReason) {
        for domain in Domain::ALL {
            self.trigger(domain, reason);
        }
    }

    /// Stops all runners. In-flight passes finish their commit first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        drop(self.triggers);
        for task in self.tasks {
            let _ = task.await;
        }
        info!("Sync engine stopped");
    }
}

// =============================================================================
// Tasks
// =============================================================================

/// One domain's runner: executes passes inline, one at a time.
async fn run_domain(
    worker: SyncWorker,
    mut trigger_rx: mpsc::Receiver<TriggerReason>,
    mut shutdown_rx: watch::Receiver<bool>,
    report_tx: mpsc::UnboundedSender<PassReport>,
) {
    loop {
        tokio::select! {
            maybe_reason = trigger_rx.recv() => {
                let Some(reason) = maybe_reason else { break };
                debug!(domain = %worker.domain(), reason = %reason, "Running sync pass");
                match worker.run_pass().await {
                    Ok(report) => {
                        let _ = report_tx.send(report);
                    }
                    Err(e) => {
                        error!(domain = %worker.domain(), error = %e, "Sync pass failed");
                    }
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }
}

/// Fires a trigger for every domain each time connectivity comes back.
async fn watch_connectivity(
    mut state_rx: watch::Receiver<crate::connectivity::ConnectivityState>,
    triggers: HashMap<Domain, mpsc::Sender<TriggerReason>>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *state_rx.borrow_and_update();
                if state.is_connected() {
                    info!("Connectivity regained, triggering all domains");
                    for sender in triggers.values() {
                        let _ = sender.try_send(TriggerReason::ConnectivityRegained);
                    }
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }
}

/// Periodic trigger for one domain.
async fn run_periodic(
    domain: Domain,
    period: std::time::Duration,
    trigger_tx: mpsc::Sender<TriggerReason>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    // The startup trigger already covers t=0.
    interval.tick().await;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let _ = trigger_tx.try_send(TriggerReason::Periodic);
            }
            _ = shutdown_rx.changed() => break,
        }
    }
    debug!(domain = %domain, "Periodic trigger stopped");
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
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts calls; optionally holds each call open until released.
    struct CountingGateway {
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl CountingGateway {
        fn new() -> Self {
            CountingGateway {
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }

        fn slow(delay: Duration) -> Self {
            CountingGateway {
                calls: AtomicUsize::new(0),
                delay: Some(delay),
            }
        }

        fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MutationGateway for CountingGateway {
        async fn execute(&self, _operation: &str, _variables: Value) -> Result<Value, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(json!({ "id": "srv-1" }))
        }
    }

    async fn engine_with(
        gateway: Arc<CountingGateway>,
        monitor: Arc<ManualMonitor>,
    ) -> (QueueStore, SyncEngine) {
        let store = QueueStore::in_memory().await.unwrap();
        let mut config = SyncConfig::default();
        // Keep timers out of the way unless a test wants them.
        config.schedule.orders_interval_secs = None;
        let engine = SyncEngine::new(store.clone(), gateway, monitor, config);
        (store, engine)
    }

    async fn next_pass_for(
        reports: &mut mpsc::UnboundedReceiver<PassReport>,
        domain: Domain,
    ) -> PassReport {
        loop {
            let report = tokio::time::timeout(Duration::from_secs(5), reports.recv())
                .await
                .expect("timed out waiting for pass report")
                .expect("report channel closed");
            if report.domain == domain {
                return report;
            }
        }
    }

    #[tokio::test]
    async fn test_startup_drains_preexisting_backlog() {
        let gateway = Arc::new(CountingGateway::new());
        let monitor = Arc::new(ManualMonitor::new(ConnectivityState::Connected));
        let (store, engine) = engine_with(gateway.clone(), monitor).await;

        let key = Domain::CashCollections.storage_key();
        store
            .queues()
            .append(key, &json!({ "amount": "50.00", "collected_at": "2024-01-01" }))
            .await
            .unwrap();

        let (handle, mut reports) = engine.spawn();
        let report = next_pass_for(&mut reports, Domain::CashCollections).await;

        assert_eq!(report.synced, 1);
        assert_eq!(store.queues().count(key).await.unwrap(), 0);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_regained_connectivity_triggers_a_pass() {
        let gateway = Arc::new(CountingGateway::new());
        let monitor = Arc::new(ManualMonitor::new(ConnectivityState::Disconnected));
        let (store, engine) = engine_with(gateway.clone(), monitor.clone()).await;

        let key = Domain::Orders.storage_key();
        store
            .queues()
            .append(key, &json!({ "items": [] }))
            .await
            .unwrap();

        let (handle, mut reports) = engine.spawn();

        // Startup pass runs offline and retains everything.
        let report = next_pass_for(&mut reports, Domain::Orders).await;
        assert_eq!(report.outcome, crate::report::PassOutcome::Offline);
        assert_eq!(store.queues().count(key).await.unwrap(), 1);

        monitor.set(ConnectivityState::Connected);

        let report = next_pass_for(&mut reports, Domain::Orders).await;
        assert_eq!(report.synced, 1);
        assert_eq!(store.queues().count(key).await.unwrap(), 0);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_triggers_during_a_pass_coalesce_to_one() {
        // Each gateway call stalls long enough for extra triggers to pile up.
        let gateway = Arc::new(CountingGateway::slow(Duration::from_millis(200)));
        let monitor = Arc::new(ManualMonitor::new(ConnectivityState::Connected));
        let (store, engine) = engine_with(gateway.clone(), monitor).await;

        let key = Domain::StockItems.storage_key();
        store
            .queues()
            .append(key, &json!({ "product_id": "p1", "qty": "1", "selling_price": "2.00" }))
            .await
            .unwrap();

        let (handle, mut reports) = engine.spawn();

        // Wait for the startup pass to be mid-flight, then spam triggers.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let first = handle.trigger(Domain::StockItems, TriggerReason::Manual);
        let second = handle.trigger(Domain::StockItems, TriggerReason::Manual);
        let third = handle.trigger(Domain::StockItems, TriggerReason::Manual);
        assert!(first, "first trigger should park behind the running pass");
        assert!(!second, "second trigger should be dropped");
        assert!(!third, "third trigger should be dropped");

        // Startup pass (1 call) plus exactly one coalesced follow-up pass
        // (queue now empty, 0 calls).
        let report = next_pass_for(&mut reports, Domain::StockItems).await;
        assert_eq!(report.synced, 1);
        let report = next_pass_for(&mut reports, Domain::StockItems).await;
        assert_eq!(report.outcome, crate::report::PassOutcome::EmptyQueue);

        assert_eq!(gateway.count(), 1);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_timer_fires_for_orders() {
        let gateway = Arc::new(CountingGateway::new());
        let monitor = Arc::new(ManualMonitor::new(ConnectivityState::Connected));
        let store = QueueStore::in_memory().await.unwrap();
        let config = SyncConfig::default();
        assert_eq!(
            config.schedule.interval_for(Domain::Orders),
            Some(Duration::from_secs(60))
        );

        let engine = SyncEngine::new(store, gateway, monitor, config);
        let (handle, mut reports) = engine.spawn();

        // Six startup passes, one per domain.
        for _ in 0..6 {
            reports.recv().await.unwrap();
        }

        tokio::time::advance(Duration::from_secs(61)).await;
        let report = next_pass_for(&mut reports, Domain::Orders).await;
        assert_eq!(report.outcome, crate::report::PassOutcome::EmptyQueue);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_from_config_rejects_invalid_endpoint() {
        let store = QueueStore::in_memory().await.unwrap();
        let mut config = SyncConfig::default();
        config.gateway.endpoint = "ftp://example.com".into();
        assert!(SyncEngine::from_config(store, config).is_err());
    }

    #[tokio::test]
    async fn test_shutdown_stops_all_runners() {
        let gateway = Arc::new(CountingGateway::new());
        let monitor = Arc::new(ManualMonitor::new(ConnectivityState::Connected));
        let (_store, engine) = engine_with(gateway, monitor).await;

        let (handle, _reports) = engine.spawn();
        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .expect("shutdown should not hang");
    }
}
