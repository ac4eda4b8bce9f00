//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Monitors and the status server produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters and gauges per endpoint)
//!
//! Consumers:
//!     → stdout (text or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
