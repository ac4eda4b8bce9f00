//! Blockchain RPC client used by the health monitor.
//!
//! # Responsibilities
//! - Dial a JSON-RPC endpoint (HTTP, WebSocket or IPC)
//! - Prove reachability with an `eth_chainId` query at dial time
//! - Answer the one query the monitor needs: current block number

use alloy::providers::{Provider, ProviderBuilder};
use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, DialOptions};

/// Anything that can report the current chain height.
///
/// [`RpcClient`] is the production implementation; tests substitute
/// scripted sources.
pub trait HeightSource: Send + Sync + 'static {
    /// Query the highest block number the endpoint reports as canonical.
    fn block_number(&self) -> impl Future<Output = BlockchainResult<u64>> + Send;
}

/// Connection to a single RPC endpoint.
#[derive(Clone)]
pub struct RpcClient {
    provider: Arc<dyn Provider + Send + Sync>,
    endpoint: String,
    chain_id: ChainId,
}

impl RpcClient {
    /// Dial an endpoint.
    ///
    /// The transport is established and the chain ID is queried before
    /// returning, so an unreachable endpoint fails here rather than on the
    /// first poll.
    pub async fn dial(endpoint: &str, options: &DialOptions) -> BlockchainResult<Self> {
        check_endpoint(endpoint)?;

        let dial_error = |reason: String| BlockchainError::Dial {
            endpoint: endpoint.to_string(),
            reason,
        };

        let connect = ProviderBuilder::new().connect(endpoint);
        let provider = match timeout(options.timeout, connect).await {
            Ok(Ok(provider)) => Arc::new(provider) as Arc<dyn Provider + Send + Sync>,
            Ok(Err(e)) => return Err(dial_error(e.to_string())),
            Err(_) => {
                return Err(dial_error(format!("connect timed out after {:?}", options.timeout)));
            }
        };

        let chain_id = match timeout(options.timeout, provider.get_chain_id()).await {
            Ok(Ok(id)) => ChainId(id),
            Ok(Err(e)) => return Err(dial_error(e.to_string())),
            Err(_) => {
                let reason = format!("chain id query timed out after {:?}", options.timeout);
                return Err(dial_error(reason));
            }
        };

        if let Some(expected) = options.expected_chain_id {
            if expected != chain_id.0 {
                return Err(BlockchainError::ChainMismatch {
                    expected,
                    actual: chain_id.0,
                });
            }
        }

        tracing::info!(endpoint = %endpoint, chain_id = chain_id.0, "RPC endpoint connected");

        Ok(Self {
            provider,
            endpoint: endpoint.to_string(),
            chain_id,
        })
    }

    /// The endpoint this client was dialed with.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Chain ID reported by the endpoint at dial time.
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }
}

impl HeightSource for RpcClient {
    async fn block_number(&self) -> BlockchainResult<u64> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| BlockchainError::Rpc(e.to_string()))
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("endpoint", &self.endpoint)
            .field("chain_id", &self.chain_id.0)
            .finish()
    }
}

/// Reject strings that look like URLs but cannot be parsed, or that use a
/// scheme no transport understands. Anything without a scheme is treated as
/// an IPC path and left to the transport.
fn check_endpoint(endpoint: &str) -> BlockchainResult<()> {
    let invalid = |reason: String| BlockchainError::InvalidUrl {
        url: endpoint.to_string(),
        reason,
    };

    if endpoint.trim().is_empty() {
        return Err(invalid("empty endpoint".to_string()));
    }
    if !endpoint.contains("://") {
        return Ok(());
    }

    let url: url::Url = endpoint.parse().map_err(|e: url::ParseError| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" | "ws" | "wss" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn quick() -> DialOptions {
        DialOptions {
            timeout: Duration::from_secs(2),
            expected_chain_id: None,
        }
    }

    #[test]
    fn test_check_endpoint() {
        assert!(check_endpoint("http://localhost:8545").is_ok());
        assert!(check_endpoint("wss://node.example/ws").is_ok());
        assert!(check_endpoint("/var/run/geth.ipc").is_ok());
        assert!(check_endpoint("").is_err());
        assert!(check_endpoint("ftp://node.example").is_err());
        assert!(check_endpoint("http://exa mple:8545").is_err());
    }

    #[tokio::test]
    async fn test_dial_unreachable_endpoint_fails() {
        // Nothing listens on port 1.
        let result = RpcClient::dial("http://127.0.0.1:1", &quick()).await;
        match result {
            Err(BlockchainError::Dial { endpoint, .. }) => {
                assert_eq!(endpoint, "http://127.0.0.1:1")
            }
            other => panic!("expected dial error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dial_invalid_url_fails_before_connecting() {
        let result = RpcClient::dial("ftp://127.0.0.1:8545", &quick()).await;
        assert!(matches!(result, Err(BlockchainError::InvalidUrl { .. })));
    }
}
