//! node-health daemon.
//!
//! ```text
//!   config / flags ──▶ startup ──▶ NodeRegistry ──▶ heartbeat per node
//!                                      │
//!                     status endpoint ◀┤
//!                     periodic report ◀┘
//!   SIGINT/SIGTERM ──▶ Shutdown ──▶ monitors stopped, tasks joined
//! ```

use clap::Parser;
use futures_util::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

use node_health::config::{read_config, validate_config, ConfigError, MonitorConfig, NodeConfig};
use node_health::health::{HeartbeatOptions, NodeRegistry};
use node_health::lifecycle::{connect_nodes, triggered, wait_for_signal, Shutdown};
use node_health::observability::{logging, metrics};
use node_health::status::{self, StatusState};

#[derive(Parser)]
#[command(name = "node-health")]
#[command(
    about = "Track chain height and failure rate of blockchain RPC endpoints",
    long_about = None
)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Endpoint to monitor; repeat for several. Added to any configured nodes.
    #[arg(short, long = "endpoint")]
    endpoints: Vec<String>,

    /// Heartbeat interval in seconds.
    #[arg(short, long)]
    interval: Option<u64>,

    /// Serve the status endpoint on this address.
    #[arg(long)]
    status_bind: Option<String>,
}

impl Cli {
    /// Merge the flags over the config file, then validate the result once.
    fn into_config(self) -> Result<MonitorConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => MonitorConfig::default(),
        };

        let offset = config.nodes.len();
        for (i, url) in self.endpoints.into_iter().enumerate() {
            config.nodes.push(NodeConfig {
                name: format!("node-{}", offset + i),
                rpc_url: url,
                chain_id: None,
            });
        }
        if let Some(secs) = self.interval {
            config.heartbeat.interval_secs = secs;
        }
        if let Some(addr) = self.status_bind {
            config.status.enabled = true;
            config.status.bind_address = addr;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;
    logging::init_logging(&config.observability);

    tracing::info!(
        nodes = config.nodes.len(),
        interval_secs = config.heartbeat.interval_secs,
        failure_window_secs = config.heartbeat.failure_window_secs,
        "node-health v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = Arc::new(connect_nodes(&config).await?);
    let options = HeartbeatOptions::from(&config.heartbeat);
    let mut tasks = registry.spawn_heartbeats(&options);

    let shutdown = Shutdown::new(registry.clone());
    let window_secs = config.heartbeat.failure_window_secs;

    if config.status.enabled {
        let listener = TcpListener::bind(&config.status.bind_address).await?;
        let state = StatusState {
            registry: registry.clone(),
            window_secs,
        };
        let rx = shutdown.subscribe();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = status::serve(listener, state, rx).await {
                tracing::error!(error = %e, "Status endpoint failed");
            }
        }));
    }

    tasks.push(tokio::spawn(report(
        registry.clone(),
        options.interval,
        window_secs,
        shutdown.subscribe(),
    )));

    wait_for_signal().await;
    shutdown.trigger();
    join_all(tasks).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Log one summary line per node every `every` until shutdown.
async fn report(
    registry: Arc<NodeRegistry>,
    every: Duration,
    window_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    // Skip the immediate first tick; nothing has been polled yet.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for node in registry.snapshots(window_secs) {
                    tracing::info!(
                        name = %node.name,
                        endpoint = %node.status.endpoint,
                        height = node.status.height,
                        recent_failures = node.status.recent_failures,
                        window_secs,
                        "Node status"
                    );
                }
            }
            _ = triggered(&mut shutdown) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("node-health").chain(args.iter().copied()))
    }

    #[test]
    fn test_endpoint_flags_complete_a_nodeless_config() {
        let name = format!("node-health-cli-{}.toml", std::process::id());
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, "[heartbeat]\ninterval_secs = 2\n").unwrap();

        let config = cli(&[
            "--config",
            path.to_str().unwrap(),
            "--endpoint",
            "http://127.0.0.1:8545",
        ])
        .into_config();
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.nodes.len(), 1);
        assert_eq!(config.nodes[0].name, "node-0");
        assert_eq!(config.nodes[0].rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.heartbeat.interval_secs, 2);
    }

    #[test]
    fn test_flags_are_validated_after_merge() {
        let err = cli(&["--endpoint", "http://127.0.0.1:8545", "--interval", "0"])
            .into_config()
            .unwrap_err();
        assert!(err.to_string().contains("heartbeat.interval_secs"));
    }

    #[test]
    fn test_no_nodes_at_all_is_rejected() {
        let err = cli(&[]).into_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
