//! Health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Heartbeat (monitor.rs):
//!     Periodic timer
//!     → HeightSource::block_number
//!     → stored height (stale on failure)
//!
//! Failure log (failure_log.rs):
//!     record_failure() → timestamp appended under lock
//!     recent_failure_count(window) → scan under the same lock
//!
//! Run state (state.rs):
//!     Running → Stopped, once
//! ```
//!
//! # Design Decisions
//! - One monitor per endpoint; nothing here ranks or selects nodes
//! - The clock is injectable so windows can be tested without sleeping

pub mod clock;
pub mod failure_log;
pub mod monitor;
pub mod registry;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use failure_log::FailureLog;
pub use monitor::{HeartbeatOptions, MonitorError, MonitorResult, NodeHealthMonitor, NodeStatus};
pub use registry::{NamedStatus, NodeRegistry, RegisteredNode};
pub use state::HeartbeatState;
