//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the node health daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Endpoints to monitor.
    pub nodes: Vec<NodeConfig>,

    /// Heartbeat and failure-window settings shared by all nodes.
    pub heartbeat: HeartbeatConfig,

    /// Read-only status endpoint.
    pub status: StatusConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// A single monitored endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
    /// Identifier used in logs and the status endpoint.
    pub name: String,

    /// JSON-RPC endpoint URL (http, https, ws, wss) or IPC path.
    pub rpc_url: String,

    /// Expected chain ID; the node is rejected at startup on mismatch.
    #[serde(default)]
    pub chain_id: Option<u64>,
}

/// Heartbeat configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Poll interval in seconds.
    pub interval_secs: u64,

    /// Per-poll timeout in seconds. Unset means no timeout.
    pub poll_timeout_secs: Option<u64>,

    /// Record a failure whenever a heartbeat poll fails.
    pub record_poll_failures: bool,

    /// Window used when reporting recent failures.
    pub failure_window_secs: u64,

    /// Drop failure entries older than this. Unset keeps everything.
    pub failure_retention_secs: Option<u64>,

    /// Timeout for dialing an endpoint at startup.
    pub dial_timeout_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            poll_timeout_secs: None,
            record_poll_failures: false,
            failure_window_secs: 60,
            failure_retention_secs: Some(3600),
            dial_timeout_secs: 10,
        }
    }
}

/// Status endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Serve `GET /status`.
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:8090").
    pub bind_address: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8090".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
