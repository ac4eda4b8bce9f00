//! Named collection of node monitors.
//!
//! # Responsibilities
//! - Hold every monitor the process runs, keyed by configured name
//! - Start and stop their heartbeats together
//! - Produce per-node snapshots for reporting
//!
//! No ranking or selection happens here; each node is reported on its own.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::blockchain::{HeightSource, RpcClient};
use crate::health::monitor::{HeartbeatOptions, MonitorError, NodeHealthMonitor, NodeStatus};

/// A monitor and the name it was configured under.
#[derive(Debug)]
pub struct RegisteredNode<S = RpcClient> {
    pub name: String,
    pub monitor: Arc<NodeHealthMonitor<S>>,
}

impl<S> Clone for RegisteredNode<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            monitor: Arc::clone(&self.monitor),
        }
    }
}

/// Snapshot of one registered node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedStatus {
    pub name: String,
    #[serde(flatten)]
    pub status: NodeStatus,
}

#[derive(Debug)]
pub struct NodeRegistry<S = RpcClient> {
    nodes: Vec<RegisteredNode<S>>,
}

impl<S> Default for NodeRegistry<S> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<S: HeightSource> NodeRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a monitor. Returns `false` and leaves the registry unchanged if
    /// the name is taken.
    pub fn insert(&mut self, name: impl Into<String>, monitor: Arc<NodeHealthMonitor<S>>) -> bool {
        let name = name.into();
        if self.get(&name).is_some() {
            tracing::warn!(name = %name, "Duplicate node name, ignoring");
            return false;
        }
        self.nodes.push(RegisteredNode { name, monitor });
        true
    }

    pub fn get(&self, name: &str) -> Option<&Arc<NodeHealthMonitor<S>>> {
        self.nodes
            .iter()
            .find(|node| node.name == name)
            .map(|node| &node.monitor)
    }

    pub fn nodes(&self) -> &[RegisteredNode<S>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn status(&self, name: &str, window_secs: u64) -> Option<NamedStatus> {
        self.get(name).map(|monitor| NamedStatus {
            name: name.to_string(),
            status: monitor.snapshot(window_secs),
        })
    }

    /// Snapshots in registration order.
    pub fn snapshots(&self, window_secs: u64) -> Vec<NamedStatus> {
        self.nodes
            .iter()
            .map(|node| NamedStatus {
                name: node.name.clone(),
                status: node.monitor.snapshot(window_secs),
            })
            .collect()
    }

    pub fn spawn_heartbeats(&self, options: &HeartbeatOptions) -> Vec<JoinHandle<()>> {
        self.nodes
            .iter()
            .map(|node| node.monitor.spawn_heartbeat(options.clone()))
            .collect()
    }

    /// Stop every monitor. Monitors that were already stopped are skipped.
    pub fn shutdown_all(&self) {
        for node in &self.nodes {
            match node.monitor.shutdown() {
                Ok(()) => {}
                Err(MonitorError::AlreadyStopped(endpoint)) => {
                    tracing::debug!(
                        name = %node.name,
                        endpoint = %endpoint,
                        "Monitor already stopped"
                    );
                }
            }
        }
    }
}
