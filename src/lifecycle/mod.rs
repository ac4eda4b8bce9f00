//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → dial every node → registry of monitors
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → resolve wait_for_signal()
//!
//! Shutdown (shutdown.rs):
//!     trigger() → registry.shutdown_all() → heartbeats exit at their next tick
//!               → status server and reporter exit
//! ```
//!
//! # Design Decisions
//! - A node that fails to dial is skipped, not fatal; zero nodes is fatal
//! - No retry of failed dials

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{triggered, Shutdown};
pub use signals::wait_for_signal;
pub use startup::{connect_nodes, StartupError};
