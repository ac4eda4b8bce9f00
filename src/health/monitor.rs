//! Per-node health monitor.
//!
//! # Responsibilities
//! - Own the connection to one RPC endpoint
//! - Periodically refresh the endpoint's chain height (the heartbeat)
//! - Keep a failure log that callers feed and query by time window
//!
//! # Design Decisions
//! - Height is stale-on-failure: a failed poll never clears it
//! - Poll failures are logged and counted in metrics but only enter the
//!   failure log when `record_poll_failures` is set. Callers that judge
//!   node health from other signals report those through `record_failure`
//! - Shutdown is checked between ticks only; an in-flight poll completes
//! - At most one heartbeat runs per monitor; a second start returns at once
//! - Shutdown only stops polling. The RPC connection is released when the
//!   monitor itself is dropped, so `height` and the failure log stay usable

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::blockchain::{BlockchainError, BlockchainResult, DialOptions, HeightSource, RpcClient};
use crate::config::HeartbeatConfig;
use crate::health::clock::{Clock, SystemClock};
use crate::health::failure_log::FailureLog;
use crate::health::state::{HeartbeatState, RunState};
use crate::lifecycle::shutdown::triggered;
use crate::observability::metrics;

const NEVER_POLLED: i64 = i64::MIN;

/// Smallest interval the heartbeat will tick at.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Errors from monitor lifecycle operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonitorError {
    #[error("monitor for {0} is already stopped")]
    AlreadyStopped(String),
}

pub type MonitorResult<T> = Result<T, MonitorError>;

/// Heartbeat tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatOptions {
    /// Time between polls. The first poll happens one interval after start.
    pub interval: Duration,
    /// Bound on a single height query. `None` waits as long as the transport does.
    pub poll_timeout: Option<Duration>,
    /// Record a failure in the log whenever a poll fails.
    pub record_poll_failures: bool,
}

impl HeartbeatOptions {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            poll_timeout: None,
            record_poll_failures: false,
        }
    }
}

impl From<&HeartbeatConfig> for HeartbeatOptions {
    fn from(config: &HeartbeatConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            poll_timeout: config.poll_timeout_secs.map(Duration::from_secs),
            record_poll_failures: config.record_poll_failures,
        }
    }
}

/// Point-in-time view of a monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub endpoint: String,
    pub chain_id: Option<u64>,
    pub height: u64,
    pub last_poll_at: Option<i64>,
    pub recent_failures: usize,
    pub window_secs: u64,
    pub running: bool,
}

/// Health monitor for a single RPC endpoint.
pub struct NodeHealthMonitor<S = RpcClient> {
    endpoint: String,
    chain_id: Option<u64>,
    source: S,
    height: AtomicU64,
    last_poll_at: AtomicI64,
    failures: FailureLog,
    clock: Arc<dyn Clock>,
    state: RunState,
    heartbeat_claimed: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
}

impl NodeHealthMonitor<RpcClient> {
    /// Dial `endpoint` with default options.
    pub async fn connect(endpoint: &str) -> BlockchainResult<Self> {
        Self::connect_with(endpoint, &DialOptions::default()).await
    }

    /// Dial `endpoint`. Fails if the endpoint cannot be reached; no monitor
    /// is created in that case.
    pub async fn connect_with(endpoint: &str, options: &DialOptions) -> BlockchainResult<Self> {
        let client = RpcClient::dial(endpoint, options).await?;
        let chain_id = client.chain_id().0;

        let mut monitor = Self::new(endpoint, client);
        monitor.chain_id = Some(chain_id);
        Ok(monitor)
    }
}

impl<S: HeightSource> NodeHealthMonitor<S> {
    /// Wrap an already-connected height source.
    pub fn new(endpoint: impl Into<String>, source: S) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            endpoint: endpoint.into(),
            chain_id: None,
            source,
            height: AtomicU64::new(0),
            last_poll_at: AtomicI64::new(NEVER_POLLED),
            failures: FailureLog::new(),
            clock: Arc::new(SystemClock),
            state: RunState::new(),
            heartbeat_claimed: AtomicBool::new(false),
            shutdown_tx,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_failure_log(mut self, failures: FailureLog) -> Self {
        self.failures = failures;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Chain ID reported when the endpoint was dialed, if it was dialed here.
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    /// Latest height seen by the heartbeat, 0 until the first successful poll.
    pub fn height(&self) -> u64 {
        self.height.load(Ordering::Acquire)
    }

    /// Unix time of the last poll attempt, successful or not.
    pub fn last_poll_at(&self) -> Option<i64> {
        match self.last_poll_at.load(Ordering::Acquire) {
            NEVER_POLLED => None,
            t => Some(t),
        }
    }

    pub fn state(&self) -> HeartbeatState {
        self.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Record a failure at the current time.
    pub fn record_failure(&self) {
        self.failures.record(self.clock.as_ref());
        metrics::record_failure(&self.endpoint);
    }

    /// Number of failures recorded less than `window_secs` seconds ago.
    pub fn recent_failure_count(&self, window_secs: u64) -> usize {
        self.failures.count_recent(self.clock.as_ref(), window_secs)
    }

    pub fn failure_log_len(&self) -> usize {
        self.failures.len()
    }

    pub fn snapshot(&self, window_secs: u64) -> NodeStatus {
        NodeStatus {
            endpoint: self.endpoint.clone(),
            chain_id: self.chain_id,
            height: self.height(),
            last_poll_at: self.last_poll_at(),
            recent_failures: self.recent_failure_count(window_secs),
            window_secs,
            running: self.is_running(),
        }
    }

    /// Stop the heartbeat. It exits at its next scheduling point.
    ///
    /// Calling this twice returns [`MonitorError::AlreadyStopped`].
    pub fn shutdown(&self) -> MonitorResult<()> {
        if !self.state.stop() {
            return Err(MonitorError::AlreadyStopped(self.endpoint.clone()));
        }

        self.shutdown_tx.send_replace(true);
        metrics::record_running(&self.endpoint, false);
        tracing::info!(endpoint = %self.endpoint, "Node monitor shutdown requested");
        Ok(())
    }

    /// Poll every `interval` until shutdown.
    pub async fn heartbeat(&self, interval: Duration) {
        self.heartbeat_with(HeartbeatOptions::every(interval)).await
    }

    /// Poll on the given schedule until shutdown.
    ///
    /// Only the first call runs the loop; later calls return immediately.
    pub async fn heartbeat_with(&self, options: HeartbeatOptions) {
        let mut shutdown = self.shutdown_tx.subscribe();
        if !self.is_running() {
            tracing::debug!(endpoint = %self.endpoint, "Monitor stopped, heartbeat not started");
            return;
        }
        if self.heartbeat_claimed.swap(true, Ordering::AcqRel) {
            tracing::debug!(endpoint = %self.endpoint, "Heartbeat already running");
            return;
        }

        let interval = if options.interval < MIN_INTERVAL {
            tracing::warn!(
                endpoint = %self.endpoint,
                requested = ?options.interval,
                "Heartbeat interval too small, clamping"
            );
            MIN_INTERVAL
        } else {
            options.interval
        };

        tracing::info!(
            endpoint = %self.endpoint,
            interval_secs = interval.as_secs_f64(),
            record_poll_failures = options.record_poll_failures,
            "Heartbeat starting"
        );
        metrics::record_running(&self.endpoint, true);

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = triggered(&mut shutdown) => {
                    tracing::info!(endpoint = %self.endpoint, "Heartbeat stopped by shutdown");
                    break;
                }
                _ = ticker.tick() => {
                    self.poll_once(&options).await;
                }
            }
        }
    }

    /// Run the heartbeat as its own task.
    pub fn spawn_heartbeat(self: &Arc<Self>, options: HeartbeatOptions) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move { monitor.heartbeat_with(options).await })
    }

    async fn poll_once(&self, options: &HeartbeatOptions) {
        self.last_poll_at.store(self.clock.now_unix(), Ordering::Release);

        let result = match options.poll_timeout {
            Some(limit) => match time::timeout(limit, self.source.block_number()).await {
                Ok(result) => result,
                Err(_) => Err(BlockchainError::Timeout(limit)),
            },
            None => self.source.block_number().await,
        };

        match result {
            Ok(height) => {
                self.height.store(height, Ordering::Release);
                metrics::record_poll(&self.endpoint, Some(height));
                tracing::debug!(endpoint = %self.endpoint, height, "Height updated");
            }
            Err(e) => {
                metrics::record_poll(&self.endpoint, None);
                tracing::warn!(
                    endpoint = %self.endpoint,
                    error = %e,
                    stale_height = self.height(),
                    "Height poll failed"
                );
                if options.record_poll_failures {
                    self.record_failure();
                }
            }
        }
    }
}

impl<S> std::fmt::Debug for NodeHealthMonitor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeHealthMonitor")
            .field("endpoint", &self.endpoint)
            .field("chain_id", &self.chain_id)
            .field("height", &self.height.load(Ordering::Relaxed))
            .field("state", &self.state.get())
            .finish()
    }
}
