//! Process-wide shutdown.
//!
//! One `trigger()` stops every node heartbeat in the registry and wakes the
//! process tasks (status server, reporter) waiting on [`triggered`].

use std::sync::Arc;
use tokio::sync::watch;

use crate::blockchain::{HeightSource, RpcClient};
use crate::health::NodeRegistry;

/// Stops the monitors and signals the tasks that serve them.
pub struct Shutdown<S = RpcClient> {
    tx: watch::Sender<bool>,
    registry: Arc<NodeRegistry<S>>,
}

impl<S: HeightSource> Shutdown<S> {
    pub fn new(registry: Arc<NodeRegistry<S>>) -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx, registry }
    }

    /// A receiver for [`triggered`]. Subscribing after the trigger still
    /// observes it.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn registry(&self) -> &Arc<NodeRegistry<S>> {
        &self.registry
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Stop every monitor, then release the subscribed tasks. Idempotent.
    pub fn trigger(&self) {
        if self.tx.send_replace(true) {
            return;
        }
        tracing::info!(nodes = self.registry.len(), "Shutting down");
        self.registry.shutdown_all();
    }
}

/// Resolve once `rx` has seen `true` or its sender is gone.
pub async fn triggered(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::BlockchainResult;
    use crate::health::{HeartbeatOptions, NodeHealthMonitor};
    use std::time::Duration;

    struct Fixed(u64);

    impl HeightSource for Fixed {
        async fn block_number(&self) -> BlockchainResult<u64> {
            Ok(self.0)
        }
    }

    fn shutdown() -> Shutdown<Fixed> {
        let mut registry = NodeRegistry::new();
        registry.insert("alpha", Arc::new(NodeHealthMonitor::new("mock://alpha", Fixed(1))));
        registry.insert("beta", Arc::new(NodeHealthMonitor::new("mock://beta", Fixed(2))));
        Shutdown::new(Arc::new(registry))
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_stops_heartbeats_and_wakes_tasks() {
        let shutdown = shutdown();
        let mut rx = shutdown.subscribe();
        let heartbeats = shutdown
            .registry()
            .spawn_heartbeats(&HeartbeatOptions::every(Duration::from_secs(1)));
        let waiter = tokio::spawn(async move { triggered(&mut rx).await });

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert!(!shutdown.is_triggered());

        shutdown.trigger();
        waiter.await.unwrap();
        for handle in heartbeats {
            handle.await.unwrap();
        }

        assert!(shutdown.is_triggered());
        assert!(shutdown.registry().nodes().iter().all(|n| !n.monitor.is_running()));
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_trigger() {
        let shutdown = shutdown();
        shutdown.trigger();
        shutdown.trigger();

        let mut rx = shutdown.subscribe();
        triggered(&mut rx).await;
    }

    #[tokio::test]
    async fn test_dropped_sender_releases_waiters() {
        let shutdown = shutdown();
        let mut rx = shutdown.subscribe();
        drop(shutdown);

        triggered(&mut rx).await;
    }
}
