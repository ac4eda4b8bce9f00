//! Shared utilities for integration tests.

use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Scriptable JSON-RPC node answering `eth_chainId` and `eth_blockNumber`.
#[derive(Clone)]
pub struct MockNode {
    pub addr: SocketAddr,
    pub chain_id: u64,
    pub height: Arc<AtomicU64>,
    pub failing: Arc<AtomicBool>,
    pub block_number_calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.block_number_calls.load(Ordering::SeqCst)
    }
}

/// Start a mock node on an ephemeral port.
pub async fn start_mock_node(chain_id: u64, height: u64) -> MockNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let node = MockNode {
        addr: listener.local_addr().unwrap(),
        chain_id,
        height: Arc::new(AtomicU64::new(height)),
        failing: Arc::new(AtomicBool::new(false)),
        block_number_calls: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new().route("/", post(handle_rpc)).with_state(node.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    node
}

async fn handle_rpc(State(node): State<MockNode>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default();

    let response = match method {
        "eth_chainId" => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": format!("0x{:x}", node.chain_id),
        }),
        "eth_blockNumber" => {
            node.block_number_calls.fetch_add(1, Ordering::SeqCst);
            if node.failing.load(Ordering::SeqCst) {
                json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32000, "message": "node unavailable" },
                })
            } else {
                json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": format!("0x{:x}", node.height.load(Ordering::SeqCst)),
                })
            }
        }
        other => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32601, "message": format!("method {} not found", other) },
        }),
    };

    Json(response)
}

/// Poll `condition` every 10ms until it holds or `limit` passes.
#[allow(dead_code)]
pub async fn wait_until<F: Fn() -> bool>(condition: F, limit: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
