//! Startup orchestration.
//!
//! # Responsibilities
//! - Dial every configured node (concurrently, results kept in config order)
//! - Attach the configured failure retention to each monitor
//! - Refuse to start with no reachable node

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use thiserror::Error;

use crate::blockchain::DialOptions;
use crate::config::MonitorConfig;
use crate::health::{FailureLog, NodeHealthMonitor, NodeRegistry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartupError {
    #[error("no node could be connected ({failed} of {total} failed)")]
    NoNodes { failed: usize, total: usize },
}

/// Dial all nodes in `config`. Unreachable nodes are logged and skipped.
pub async fn connect_nodes(config: &MonitorConfig) -> Result<NodeRegistry, StartupError> {
    let hb = &config.heartbeat;
    let dial_timeout = Duration::from_secs(hb.dial_timeout_secs);

    let attempts = config.nodes.iter().map(|node| async move {
        let options = DialOptions {
            timeout: dial_timeout,
            expected_chain_id: node.chain_id,
        };
        (node, NodeHealthMonitor::connect_with(&node.rpc_url, &options).await)
    });

    let mut registry = NodeRegistry::new();
    let mut failed = 0;

    for (node, result) in join_all(attempts).await {
        match result {
            Ok(monitor) => {
                let failures = match hb.failure_retention_secs {
                    Some(secs) => FailureLog::with_retention(secs),
                    None => FailureLog::new(),
                };
                registry.insert(node.name.clone(), Arc::new(monitor.with_failure_log(failures)));
            }
            Err(e) => {
                failed += 1;
                tracing::error!(
                    name = %node.name,
                    endpoint = %node.rpc_url,
                    error = %e,
                    "Node unreachable, skipping"
                );
            }
        }
    }

    if registry.is_empty() {
        return Err(StartupError::NoNodes {
            failed,
            total: config.nodes.len(),
        });
    }

    tracing::info!(connected = registry.len(), failed, "Nodes connected");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;

    #[tokio::test]
    async fn test_all_unreachable_is_an_error() {
        let mut config = MonitorConfig::default();
        config.heartbeat.dial_timeout_secs = 2;
        config.nodes.push(NodeConfig {
            name: "dead".into(),
            rpc_url: "http://127.0.0.1:1".into(),
            chain_id: None,
        });

        let err = connect_nodes(&config).await.unwrap_err();
        assert_eq!(err, StartupError::NoNodes { failed: 1, total: 1 });
    }
}
