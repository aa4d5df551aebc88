//! # Connectivity Monitor
//!
//! Network reachability: a point-in-time check plus transition notifications.
//!
//! ## Monitoring Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Connectivity Monitoring                              │
//! │                                                                         │
//! │  ┌──────────────────┐  probe every N secs   ┌───────────────────────┐  │
//! │  │   ProbeMonitor   │ ────────────────────► │  TCP connect to the   │  │
//! │  │ (background task)│ ◄──────────────────── │  gateway host:port    │  │
//! │  └────────┬─────────┘   ok / refused /      └───────────────────────┘  │
//! │           │              timed out                                      │
//! │           │ publish transitions only                                    │
//! │           ▼                                                             │
//! │  watch::channel<ConnectivityState>                                     │
//! │           │                                                             │
//! │     ┌─────┴─────┬───────────┬─ ... one receiver per domain runner      │
//! │     ▼           ▼           ▼                                           │
//! │  orders     stockItems  cashCollections                                 │
//! │                                                                         │
//! │  WHY A WATCH CHANNEL                                                    │
//! │  ─────────────────────                                                  │
//! │  Receivers always see the LATEST state: a transition that fires        │
//! │  while a runner is mid-pass is picked up as soon as the runner         │
//! │  returns to its select loop. Duplicate observations are harmless;      │
//! │  a missed offline→online transition would stall sync entirely.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Connectivity State
// =============================================================================

/// Process-wide network reachability state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    /// The gateway host is reachable.
    Connected,

    /// The gateway host is not reachable.
    Disconnected,

    /// Reachability could not be determined.
    ///
    /// Consumers treat this conservatively as disconnected.
    Unknown,
}

impl ConnectivityState {
    /// Returns true only for a positively confirmed connection.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectivityState::Connected)
    }
}

impl std::fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectivityState::Connected => write!(f, "connected"),
            ConnectivityState::Disconnected => write!(f, "disconnected"),
            ConnectivityState::Unknown => write!(f, "unknown"),
        }
    }
}

// =============================================================================
// Monitor Trait
// =============================================================================

/// Source of connectivity information for workers and the orchestrator.
///
/// Consumed, never produced, by the sync engine: implementations own the
/// probing; the engine only reads state and reacts to transitions.
#[async_trait]
pub trait ConnectivityMonitor: Send + Sync {
    /// Point-in-time reachability check. May itself perform a lightweight
    /// probe; must not block longer than the probe timeout.
    async fn current(&self) -> ConnectivityState;

    /// Subscribes to connectivity transitions.
    ///
    /// Every subscriber observes at least the latest state after any
    /// transition; duplicates are tolerable, missed transitions are not.
    fn subscribe(&self) -> watch::Receiver<ConnectivityState>;
}

// =============================================================================
// Probe Monitor
// =============================================================================

/// Configuration for the TCP reachability probe.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Probe target as `host:port`.
    pub target: String,

    /// Interval between background probes.
    pub interval: Duration,

    /// Per-probe timeout; an elapsed timeout counts as disconnected.
    pub timeout: Duration,
}

impl ProbeConfig {
    /// Derives a probe target from the gateway endpoint URL.
    pub fn from_endpoint(endpoint: &str, interval: Duration, probe_timeout: Duration) -> SyncResult<Self> {
        let parsed = url::Url::parse(endpoint)?;
        let host = parsed
            .host_str()
            .ok_or_else(|| SyncError::InvalidUrl(format!("endpoint has no host: {endpoint}")))?;
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| SyncError::InvalidUrl(format!("endpoint has no port: {endpoint}")))?;

        Ok(ProbeConfig {
            target: format!("{host}:{port}"),
            interval,
            timeout: probe_timeout,
        })
    }
}

/// Connectivity monitor backed by a periodic TCP connect probe.
///
/// The platform's own reachability facility feeds the mobile shell; inside
/// the engine a plain TCP connect to the gateway is the portable equivalent.
pub struct ProbeMonitor {
    config: ProbeConfig,
    state_tx: watch::Sender<ConnectivityState>,
    shutdown_tx: mpsc::Sender<()>,
}

impl ProbeMonitor {
    /// Spawns the background probe task and returns the monitor.
    ///
    /// The published state starts as `Unknown` and stays there only until
    /// the first probe completes; the first probe always publishes a
    /// transition.
    pub fn spawn(config: ProbeConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectivityState::Unknown);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        let task_tx = state_tx.clone();
        let task_config = config.clone();

        tokio::spawn(async move {
            info!(target = %task_config.target, "Connectivity probe starting");
            let mut interval = tokio::time::interval(task_config.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let state = probe_once(&task_config.target, task_config.timeout).await;
                        publish_transition(&task_tx, state);
                    }

                    _ = shutdown_rx.recv() => {
                        info!("Connectivity probe shutting down");
                        break;
                    }
                }
            }
        });

        ProbeMonitor {
            config,
            state_tx,
            shutdown_tx,
        }
    }

    /// Stops the background probe task.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

#[async_trait]
impl ConnectivityMonitor for ProbeMonitor {
    async fn current(&self) -> ConnectivityState {
        // Fresh probe rather than the cached value: a pass about to drain a
        // queue wants the state now, not as of the last interval tick.
        let state = probe_once(&self.config.target, self.config.timeout).await;
        publish_transition(&self.state_tx, state);
        state
    }

    fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.state_tx.subscribe()
    }
}

/// One TCP connect attempt against the target.
async fn probe_once(target: &str, probe_timeout: Duration) -> ConnectivityState {
    match timeout(probe_timeout, TcpStream::connect(target)).await {
        Ok(Ok(_)) => ConnectivityState::Connected,
        Ok(Err(e)) => {
            debug!(target = %target, error = %e, "Probe failed");
            ConnectivityState::Disconnected
        }
        Err(_) => {
            debug!(target = %target, "Probe timed out");
            ConnectivityState::Disconnected
        }
    }
}

/// Publishes only genuine transitions so subscribers aren't woken for
/// every probe tick.
fn publish_transition(tx: &watch::Sender<ConnectivityState>, state: ConnectivityState) {
    let changed = tx.send_if_modified(|current| {
        if *current != state {
            *current = state;
            true
        } else {
            false
        }
    });

    if changed {
        info!(state = %state, "Connectivity transition");
    }
}

// =============================================================================
// Manual Monitor
// =============================================================================

/// A monitor whose state is set by hand.
///
/// Used by tests and by shells that already receive reachability events from
/// the platform and merely forward them into the engine.
pub struct ManualMonitor {
    state_tx: watch::Sender<ConnectivityState>,
}

impl ManualMonitor {
    /// Creates a monitor holding the given initial state.
    pub fn new(initial: ConnectivityState) -> Self {
        let (state_tx, _) = watch::channel(initial);
        ManualMonitor { state_tx }
    }

    /// Sets the state, notifying subscribers only on a genuine transition.
    pub fn set(&self, state: ConnectivityState) {
        publish_transition(&self.state_tx, state);
    }
}

#[async_trait]
impl ConnectivityMonitor for ManualMonitor {
    async fn current(&self) -> ConnectivityState {
        *self.state_tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.state_tx.subscribe()
    }
}
