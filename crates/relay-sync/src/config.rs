//! # Sync Configuration
//!
//! Configuration management for the sync engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RELAY_GATEWAY_ENDPOINT=https://pos.example.com/graphql             │
//! │     RELAY_RETRY_MAX_ATTEMPTS=3                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/relay-pos/relay.toml (Linux)                             │
//! │     ~/Library/Application Support/com.relay.pos/relay.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     3 attempts, 2s base delay, orders every 60s                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # relay.toml
//! [gateway]
//! endpoint = "https://pos.example.com/graphql"
//! request_timeout_secs = 30
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 2000
//!
//! [connectivity]
//! probe_interval_secs = 10
//! probe_timeout_secs = 3
//!
//! [schedule]
//! orders_interval_secs = 60   # highest-volume domain resyncs every minute
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use relay_core::Domain;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Retry Policy
// =============================================================================

/// Per-record retry behavior within one sync pass.
///
/// ## Linear Backoff
/// ```text
/// attempt 1 ── fail ── wait 1 × base (2s) ── attempt 2 ── fail ──
/// wait 2 × base (4s) ── attempt 3 ── fail ── RETAIN (no further wait)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total gateway calls per record per pass (including the first).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay; the wait before attempt N+1 is N × base.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    2_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// The delay to wait after a failed attempt before the next one.
    ///
    /// `failed_attempts` is the number of attempts consumed so far, so the
    /// delays grow strictly: 2s after the first failure, 4s after the second.
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms * u64::from(failed_attempts))
    }
}

// =============================================================================
// Gateway Settings
// =============================================================================

/// Remote GraphQL gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// GraphQL endpoint URL (http or https).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout (seconds). A timeout consumes one retry attempt.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://pos.example.com/graphql".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for GatewaySettings {
    fn default() -> Self {
        GatewaySettings {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// =============================================================================
// Connectivity Settings
// =============================================================================

/// Reachability probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivitySettings {
    /// Interval between background reachability probes (seconds).
    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,

    /// Per-probe timeout (seconds).
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_probe_interval() -> u64 {
    10
}

fn default_probe_timeout() -> u64 {
    3
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        ConnectivitySettings {
            probe_interval_secs: default_probe_interval(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

// =============================================================================
// Schedule Settings
// =============================================================================

/// Periodic resync intervals, independently configurable per domain.
///
/// `None` disables the periodic timer for that domain - it still syncs on
/// startup and whenever connectivity is regained. Only orders, the
/// highest-volume domain, resyncs on a timer by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSettings {
    #[serde(default = "default_orders_interval", skip_serializing_if = "Option::is_none")]
    pub orders_interval_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_items_interval_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_takes_interval_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_adjustments_interval_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_collections_interval_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_consumptions_interval_secs: Option<u64>,
}

fn default_orders_interval() -> Option<u64> {
    Some(60)
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        ScheduleSettings {
            orders_interval_secs: default_orders_interval(),
            stock_items_interval_secs: None,
            stock_takes_interval_secs: None,
            price_adjustments_interval_secs: None,
            cash_collections_interval_secs: None,
            internal_consumptions_interval_secs: None,
        }
    }
}

impl ScheduleSettings {
    /// Returns the periodic interval for a domain, if one is configured.
    pub fn interval_for(&self, domain: Domain) -> Option<Duration> {
        let secs = match domain {
            Domain::Orders => self.orders_interval_secs,
            Domain::StockItems => self.stock_items_interval_secs,
            Domain::StockTakes => self.stock_takes_interval_secs,
            Domain::PriceAdjustments => self.price_adjustments_interval_secs,
            Domain::CashCollections => self.cash_collections_interval_secs,
            Domain::InternalConsumptions => self.internal_consumptions_interval_secs,
        };
        secs.map(Duration::from_secs)
    }
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete sync engine configuration.
///
/// ## Example Config File
/// ```toml
/// [gateway]
/// endpoint = "https://pos.example.com/graphql"
///
/// [retry]
/// max_attempts = 3
/// base_delay_ms = 2000
///
/// [schedule]
/// orders_interval_secs = 60
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Remote gateway settings.
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Per-record retry policy.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Reachability probe settings.
    #[serde(default)]
    pub connectivity: ConnectivitySettings,

    /// Periodic resync schedule.
    #[serde(default)]
    pub schedule: ScheduleSettings,
}

impl SyncConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (relay.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load sync config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Sync config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        let parsed = url::Url::parse(&self.gateway.endpoint)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(SyncError::InvalidUrl(format!(
                "endpoint must be http or https, got: {}",
                self.gateway.endpoint
            )));
        }
        if parsed.host_str().is_none() {
            return Err(SyncError::InvalidUrl(format!(
                "endpoint has no host: {}",
                self.gateway.endpoint
            )));
        }

        if self.retry.max_attempts == 0 {
            return Err(SyncError::InvalidConfig(
                "retry.max_attempts must be greater than 0".into(),
            ));
        }

        if self.connectivity.probe_interval_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "connectivity.probe_interval_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("RELAY_GATEWAY_ENDPOINT") {
            debug!(endpoint = %endpoint, "Overriding gateway endpoint from environment");
            self.gateway.endpoint = endpoint;
        }

        if let Ok(attempts) = std::env::var("RELAY_RETRY_MAX_ATTEMPTS") {
            if let Ok(parsed) = attempts.parse::<u32>() {
                self.retry.max_attempts = parsed;
            }
        }

        if let Ok(delay) = std::env::var("RELAY_RETRY_BASE_DELAY_MS") {
            if let Ok(parsed) = delay.parse::<u64>() {
                self.retry.base_delay_ms = parsed;
            }
        }

        if let Ok(interval) = std::env::var("RELAY_ORDERS_INTERVAL_SECS") {
            match interval.parse::<u64>() {
                Ok(0) => self.schedule.orders_interval_secs = None,
                Ok(parsed) => self.schedule.orders_interval_secs = Some(parsed),
                Err(_) => warn!(interval = %interval, "Ignoring invalid orders interval"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "relay", "pos")
            .map(|dirs| dirs.config_dir().join("relay.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the per-request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway.request_timeout_secs)
    }

    /// Returns the probe interval as a Duration.
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.connectivity.probe_interval_secs)
    }

    /// Returns the probe timeout as a Duration.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.connectivity.probe_timeout_secs)
    }
}
