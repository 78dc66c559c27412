//! Shared utilities for integration testing.

#![allow(dead_code)]

pub mod iotex_node;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::B256;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chain_adapter::blockchain::Signature65;
use chain_adapter::chains::filecoin::Cid;
use k256::ecdsa::SigningKey;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const ANVIL_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Caller-side signer; the adapters never see the private key.
pub struct TestKey(SigningKey);

impl TestKey {
    pub fn anvil() -> Self {
        Self(SigningKey::from_slice(&hex::decode(ANVIL_PRIVATE_KEY).unwrap()).unwrap())
    }

    pub fn compressed_public_key(&self) -> Vec<u8> {
        self.0.verifying_key().to_encoded_point(true).as_bytes().to_vec()
    }

    pub fn uncompressed_public_key(&self) -> Vec<u8> {
        self.0.verifying_key().to_encoded_point(false).as_bytes().to_vec()
    }

    pub fn sign(&self, digest: &B256) -> Signature65 {
        let (signature, recovery_id) = self.0.sign_prehash_recoverable(digest.as_slice()).unwrap();
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        Signature65::from(out)
    }
}

/// In-memory Lotus node speaking just enough JSON-RPC for the client.
#[derive(Default)]
pub struct MockLotus {
    pub version_calls: AtomicUsize,
    pub head: AtomicI64,
    /// Error message returned by `MpoolPush`, if set.
    pub reject_with: Mutex<Option<String>>,
    pub pushed: Mutex<Vec<Value>>,
    pub authorization: Mutex<Vec<Option<String>>>,
    /// Included messages by CID string: raw CBOR and inclusion height.
    objects: Mutex<HashMap<String, (Vec<u8>, i64)>>,
}

impl MockLotus {
    /// Make a serialized message visible to lookups at `height`.
    pub fn include(&self, bytes: &[u8], height: i64) {
        let cid = Cid::of_dag_cbor(bytes).to_string();
        self.objects.lock().unwrap().insert(cid, (bytes.to_vec(), height));
    }

    fn handle(&self, method: &str, params: &Value) -> Result<Value, (i64, String)> {
        match method {
            "Filecoin.Version" => {
                self.version_calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!({ "Version": "mock+lotus", "APIVersion": 65792, "BlockDelay": 30 }))
            }
            "Filecoin.ChainHead" => Ok(json!({
                "Cids": [],
                "Blocks": [],
                "Height": self.head.load(Ordering::SeqCst),
            })),
            "Filecoin.MpoolPush" => {
                if let Some(reason) = self.reject_with.lock().unwrap().clone() {
                    return Err((1, reason));
                }
                self.pushed.lock().unwrap().push(params[0].clone());
                Ok(json!({ "/": "bafy2bzacemockpushed" }))
            }
            "Filecoin.StateSearchMsg" => {
                let cid = params[0]["/"].as_str().unwrap_or_default();
                Ok(match self.objects.lock().unwrap().get(cid) {
                    Some((_, height)) => json!({
                        "Message": { "/": cid },
                        "Receipt": { "ExitCode": 0, "Return": null, "GasUsed": 1 },
                        "TipSet": [],
                        "Height": height,
                    }),
                    None => Value::Null,
                })
            }
            "Filecoin.ChainReadObj" => {
                let cid = params[0]["/"].as_str().unwrap_or_default();
                match self.objects.lock().unwrap().get(cid) {
                    Some((bytes, _)) => Ok(Value::String(STANDARD.encode(bytes))),
                    None => Err((1, "blockstore: block not found".to_string())),
                }
            }
            other => Err((-32601, format!("method '{}' not found", other))),
        }
    }
}

async fn rpc(
    State(mock): State<Arc<MockLotus>>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> impl IntoResponse {
    mock.authorization.lock().unwrap().push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    let method = request["method"].as_str().unwrap_or_default();
    let body = match mock.handle(method, &request["params"]) {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "error": { "code": code, "message": message },
        }),
    };
    // No keep-alive, so a stopped node refuses the next request.
    ([(header::CONNECTION, "close")], Json(body))
}

/// Serve `mock` on `addr` until the returned handle is aborted.
pub async fn serve_mock_lotus(addr: SocketAddr, mock: Arc<MockLotus>) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind(addr).await.unwrap();
    let local = listener.local_addr().unwrap();
    let app = Router::new().route("/rpc/v0", post(rpc)).with_state(mock);

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (local, handle)
}

/// Start a fresh mock node on an ephemeral port.
pub async fn start_mock_lotus() -> (Arc<MockLotus>, SocketAddr, JoinHandle<()>) {
    let mock = Arc::new(MockLotus::default());
    let (addr, handle) = serve_mock_lotus("127.0.0.1:0".parse().unwrap(), mock.clone()).await;
    (mock, addr, handle)
}

pub fn endpoint(addr: SocketAddr) -> String {
    format!("http://{}/rpc/v0", addr)
}
