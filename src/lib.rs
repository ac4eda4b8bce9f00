//! Health tracking for blockchain RPC endpoints.
//!
//! Each endpoint gets a [`NodeHealthMonitor`]: a heartbeat that keeps the
//! latest chain height, plus a failure log queried by time window.

pub mod blockchain;
pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod status;

pub use blockchain::{BlockchainError, HeightSource, RpcClient};
pub use config::MonitorConfig;
pub use health::{HeartbeatOptions, NodeHealthMonitor, NodeRegistry, NodeStatus};
pub use lifecycle::Shutdown;
