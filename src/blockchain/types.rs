//! Chain-specific types and error definitions.

use std::time::Duration;
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur while talking to a node.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// The endpoint could not be reached when the connection was established.
    #[error("failed to dial {endpoint}: {reason}")]
    Dial { endpoint: String, reason: String },

    /// The endpoint string is not a usable URL.
    #[error("invalid RPC URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0:?}")]
    Timeout(Duration),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Options applied while dialing an endpoint.
#[derive(Debug, Clone)]
pub struct DialOptions {
    /// Upper bound for establishing the transport and the chain-id query.
    pub timeout: Duration,
    /// Reject the endpoint if it reports a different chain.
    pub expected_chain_id: Option<u64>,
}

impl Default for DialOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            expected_chain_id: None,
        }
    }
}
