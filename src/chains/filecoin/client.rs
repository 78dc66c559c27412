//! Lotus JSON-RPC client.
//!
//! # Lookup flow
//! ```text
//! StateSearchMsg(cid)  → inclusion height, null when unknown
//! ChainReadObj(cid)    → raw CBOR of the message
//! ChainHead()          → tip height for the confirmation count
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::blockchain::{ChainError, ChainResult, Client, ClientOptions};
use crate::chains::{confirmations, lookup_outcome};
use crate::chains::filecoin::cid::{Cid, CidLink};
use crate::chains::filecoin::lotus::{
    LotusSignedMessage, MsgLookup, RpcRequest, RpcResponse, TipSet,
};
use crate::chains::filecoin::transaction::FilecoinTx;
use crate::chains::filecoin::CHAIN;
use crate::config::{FilecoinConfig, FilecoinNetwork};
use crate::net::{Connection, ConnectionId, ConnectionState, Dialer, LazyConnection, ShutdownFlag};
use crate::observability::metrics::{self, Outcome};

/// Why a JSON-RPC call failed.
#[derive(Debug)]
enum RpcFailure {
    /// The request never produced a response.
    Transport(String),
    /// The node answered with a JSON-RPC error object.
    Remote(String),
    /// The node answered with something that is not the expected result.
    Invalid(String),
}

impl RpcFailure {
    fn into_message(self) -> String {
        match self {
            RpcFailure::Transport(m) | RpcFailure::Remote(m) | RpcFailure::Invalid(m) => m,
        }
    }
}

/// HTTP client bound to one Lotus endpoint.
#[derive(Debug, Clone)]
pub struct LotusConnection {
    id: ConnectionId,
    http: reqwest::Client,
    url: String,
    next_id: Arc<AtomicU64>,
    shutdown: ShutdownFlag,
}

impl LotusConnection {
    async fn call<P, R>(&self, method: &str, params: P) -> Result<R, RpcFailure>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    tracing::debug!(connection_id = %self.id, error = %e, "Node unreachable, marking connection stale");
                    self.shutdown.trip();
                }
                RpcFailure::Transport(format!("{} request failed: {}", method, e))
            })?;

        let status = response.status();
        let body: RpcResponse = response.json().await.map_err(|e| {
            RpcFailure::Invalid(format!("{} returned HTTP {} without JSON-RPC body: {}", method, status, e))
        })?;

        if let Some(error) = body.error {
            return Err(RpcFailure::Remote(error.message));
        }
        serde_json::from_value(body.result)
            .map_err(|e| RpcFailure::Invalid(format!("{} returned unexpected result: {}", method, e)))
    }
}

impl Connection for LotusConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.is_tripped()
    }
}

/// Builds an HTTP client and checks the node answers `Filecoin.Version`.
#[derive(Debug, Clone)]
pub struct HttpDialer {
    options: ClientOptions,
}

impl HttpDialer {
    pub fn new(options: ClientOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Dialer for HttpDialer {
    type Conn = LotusConnection;

    fn chain(&self) -> &'static str {
        CHAIN
    }

    async fn dial(&self) -> ChainResult<LotusConnection> {
        let url = self.options.endpoint_url();

        let mut headers = HeaderMap::new();
        if let Some(bearer) = self.options.bearer() {
            let value = HeaderValue::from_str(&bearer).map_err(|_| {
                ChainError::Connection("auth token is not a valid header value".to_string())
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        // Node endpoints are dialed directly, like the gRPC transport.
        let http = reqwest::Client::builder()
            .no_proxy()
            .default_headers(headers)
            .build()
            .map_err(|e| ChainError::Connection(format!("failed to build HTTP client: {}", e)))?;

        let conn = LotusConnection {
            id: ConnectionId::new(),
            http,
            url: url.clone(),
            next_id: Arc::new(AtomicU64::new(1)),
            shutdown: ShutdownFlag::new(),
        };

        let version: serde_json::Value = conn
            .call("Filecoin.Version", [(); 0])
            .await
            .map_err(|e| ChainError::Connection(format!("failed to dial {}: {}", url, e.into_message())))?;
        tracing::debug!(
            connection_id = %conn.id,
            version = %version.get("Version").and_then(|v| v.as_str()).unwrap_or("unknown"),
            "Lotus node reachable"
        );
        Ok(conn)
    }
}

/// Submits and looks up Filecoin messages through a Lotus node.
#[derive(Debug)]
pub struct FilecoinClient {
    connection: LazyConnection<HttpDialer>,
    network: FilecoinNetwork,
}

impl FilecoinClient {
    pub fn new(options: ClientOptions, network: FilecoinNetwork) -> Self {
        Self {
            connection: LazyConnection::new(HttpDialer::new(options)),
            network,
        }
    }

    pub fn from_config(config: &FilecoinConfig) -> Self {
        Self::new(ClientOptions::from(config), config.network)
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.connection.state().await
    }

    /// Height of the node's heaviest tipset.
    pub async fn chain_height(&self) -> ChainResult<u64> {
        let conn = self.connection.connect().await?;
        head_height(&conn).await
    }

    async fn lookup(&self, hash: &[u8]) -> ChainResult<(FilecoinTx, u64)> {
        let cid = Cid::from_bytes(hash)?;
        let link = CidLink::from(&cid);
        let conn = self.connection.connect().await?;

        let lookup: Option<MsgLookup> = conn
            .call("Filecoin.StateSearchMsg", [&link])
            .await
            .map_err(|e| ChainError::Rpc(e.into_message()))?;
        let Some(lookup) = lookup else {
            return Err(ChainError::NotFound(format!("no message with cid {}", cid)));
        };
        let height = block_height(lookup.height, "StateSearchMsg")?;

        let raw: String = conn
            .call("Filecoin.ChainReadObj", [&link])
            .await
            .map_err(|e| ChainError::Rpc(e.into_message()))?;
        let bytes = STANDARD
            .decode(raw.as_bytes())
            .map_err(|e| ChainError::Rpc(format!("ChainReadObj returned invalid base64: {}", e)))?;
        let tx = FilecoinTx::deserialize_for(self.network, &bytes)?;

        let head = head_height(&conn).await?;
        let confirmations = confirmations(head, height);

        tracing::debug!(
            connection_id = %conn.id,
            cid = %cid,
            height,
            confirmations,
            "Message found"
        );
        Ok((tx, confirmations))
    }
}

async fn head_height(conn: &LotusConnection) -> ChainResult<u64> {
    let head: TipSet = conn
        .call("Filecoin.ChainHead", [(); 0])
        .await
        .map_err(|e| ChainError::Rpc(e.into_message()))?;
    block_height(head.height, "ChainHead")
}

/// Lotus reports epochs as signed integers; a negative one is a node bug.
fn block_height(height: i64, method: &str) -> ChainResult<u64> {
    u64::try_from(height)
        .map_err(|_| ChainError::Rpc(format!("{} returned negative height {}", method, height)))
}

#[async_trait]
impl Client for FilecoinClient {
    type Tx = FilecoinTx;

    async fn tx(&self, hash: &[u8]) -> ChainResult<(FilecoinTx, u64)> {
        let result = self.lookup(hash).await;
        metrics::record_lookup(CHAIN, lookup_outcome(&result));
        result
    }

    async fn submit_tx(&self, tx: &FilecoinTx) -> ChainResult<()> {
        let signed = LotusSignedMessage::try_from(tx)?;
        let conn = self.connection.connect().await?;

        match conn.call::<_, CidLink>("Filecoin.MpoolPush", [&signed]).await {
            Ok(link) => {
                metrics::record_submission(CHAIN, Outcome::Ok);
                tracing::info!(
                    connection_id = %conn.id,
                    cid = %link.root,
                    nonce = tx.message().nonce,
                    "Message pushed to mpool"
                );
                Ok(())
            }
            Err(failure) => {
                let outcome = match failure {
                    RpcFailure::Remote(_) => Outcome::Rejected,
                    _ => Outcome::Error,
                };
                metrics::record_submission(CHAIN, outcome);
                let reason = failure.into_message();
                tracing::warn!(connection_id = %conn.id, reason = %reason, "Message rejected");
                Err(ChainError::Submission(reason))
            }
        }
    }
}
