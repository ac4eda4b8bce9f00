//! Blockchain RPC layer.
//!
//! # Data Flow
//! ```text
//! endpoint URL
//!     → client.rs (dial + chain-id check)
//!     → HeightSource::block_number (polled by the health monitor)
//! ```
//!
//! # Constraints
//! - Dialing fails fast: an unreachable endpoint never yields a client
//! - Only chain height is queried; no retries happen at this layer

pub mod client;
pub mod types;

pub use client::{HeightSource, RpcClient};
pub use types::{BlockchainError, BlockchainResult, ChainId, DialOptions};
