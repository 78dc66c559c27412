//! IoTeX gRPC client.

use alloy::primitives::U256;
use async_trait::async_trait;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{ClientTlsConfig, Endpoint};
use tonic::{Code, Request, Status};

use crate::blockchain::{ChainError, ChainResult, Client, ClientOptions, GasPriceSource};
use crate::chains::{confirmations, lookup_outcome};
use crate::chains::iotex::proto::{
    get_actions_request, ApiServiceClient, GetActionByHashRequest, GetActionsRequest,
    GetChainMetaRequest, SendActionRequest, SuggestGasPriceRequest,
};
use crate::chains::iotex::transaction::IotexTx;
use crate::chains::iotex::CHAIN;
use crate::config::IotexConfig;
use crate::net::{Connection, ConnectionId, ConnectionState, Dialer, LazyConnection, ShutdownFlag};
use crate::observability::metrics::{self, Outcome};

/// A dialed gRPC channel plus the metadata attached to every call.
#[derive(Debug, Clone)]
pub struct IotexConnection {
    id: ConnectionId,
    client: ApiServiceClient,
    authorization: Option<MetadataValue<Ascii>>,
    shutdown: ShutdownFlag,
}

impl IotexConnection {
    fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        if let Some(value) = &self.authorization {
            request.metadata_mut().insert("authorization", value.clone());
        }
        request
    }

    /// Mark the channel stale when a call failed at the transport level.
    fn observe(&self, status: &Status) {
        if status.code() == Code::Unavailable {
            tracing::debug!(
                connection_id = %self.id,
                error = %status.message(),
                "Transport unavailable, marking connection stale"
            );
            self.shutdown.trip();
        }
    }
}

impl Connection for IotexConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.is_tripped()
    }
}

/// Dials `iotexapi.APIService` endpoints, with TLS when configured.
#[derive(Debug, Clone)]
pub struct GrpcDialer {
    options: ClientOptions,
}

impl GrpcDialer {
    pub fn new(options: ClientOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Dialer for GrpcDialer {
    type Conn = IotexConnection;

    fn chain(&self) -> &'static str {
        CHAIN
    }

    async fn dial(&self) -> ChainResult<IotexConnection> {
        let url = self.options.endpoint_url();
        let mut endpoint = Endpoint::from_shared(url.clone())
            .map_err(|e| ChainError::Connection(format!("invalid endpoint {}: {}", url, e)))?;
        if self.options.secure {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_webpki_roots())
                .map_err(|e| ChainError::Connection(format!("tls config for {}: {}", url, e)))?;
        }

        let authorization = match self.options.bearer() {
            Some(bearer) => Some(bearer.parse::<MetadataValue<Ascii>>().map_err(|_| {
                ChainError::Connection("auth token is not valid metadata".to_string())
            })?),
            None => None,
        };

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| ChainError::Connection(format!("failed to dial {}: {}", url, e)))?;

        Ok(IotexConnection {
            id: ConnectionId::new(),
            client: ApiServiceClient::new(channel),
            authorization,
            shutdown: ShutdownFlag::new(),
        })
    }
}

/// Submits and looks up IoTeX actions over one lazily dialed channel.
#[derive(Debug)]
pub struct IotexClient {
    connection: LazyConnection<GrpcDialer>,
}

impl IotexClient {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            connection: LazyConnection::new(GrpcDialer::new(options)),
        }
    }

    pub fn from_config(config: &IotexConfig) -> Self {
        Self::new(ClientOptions::from(config))
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.connection.state().await
    }

    /// Height of the node's chain tip.
    pub async fn chain_height(&self) -> ChainResult<u64> {
        let conn = self.connection.connect().await?;
        tip_height(&conn).await
    }

    async fn lookup(&self, hash: &[u8]) -> ChainResult<(IotexTx, u64)> {
        let key = hex::encode(hash);
        let conn = self.connection.connect().await?;
        let mut client = conn.client.clone();

        let request = GetActionsRequest {
            lookup: Some(get_actions_request::Lookup::ByHash(GetActionByHashRequest {
                action_hash: key.clone(),
                check_pending: false,
            })),
        };
        let infos = match client.get_actions(conn.request(request)).await {
            Ok(response) => response.into_inner().action_info,
            Err(status) if status.code() == Code::NotFound => {
                return Err(ChainError::NotFound(status.message().to_string()));
            }
            Err(status) => return Err(rpc_error(&conn, status)),
        };

        let info = select_single(infos, &key)?;
        let action = info.action.ok_or_else(|| {
            ChainError::Rpc(format!("action {} returned without its envelope", key))
        })?;
        let tx = IotexTx::from_action(action)?;

        let tip = tip_height(&conn).await?;
        let confirmations = confirmations(tip, info.blk_height);

        tracing::debug!(
            connection_id = %conn.id,
            hash = %key,
            block = info.blk_height,
            confirmations,
            "Action found"
        );
        Ok((tx, confirmations))
    }
}

async fn tip_height(conn: &IotexConnection) -> ChainResult<u64> {
    let mut client = conn.client.clone();
    let response = client
        .get_chain_meta(conn.request(GetChainMetaRequest {}))
        .await
        .map_err(|status| rpc_error(conn, status))?;
    response
        .into_inner()
        .chain_meta
        .map(|meta| meta.height)
        .ok_or_else(|| ChainError::Rpc("chain meta missing from response".to_string()))
}

fn rpc_error(conn: &IotexConnection, status: Status) -> ChainError {
    conn.observe(&status);
    ChainError::Rpc(status.message().to_string())
}

/// The one record a lookup matched; none or several is `NotFound`.
pub(crate) fn select_single<T>(mut records: Vec<T>, key: &str) -> ChainResult<T> {
    match records.len() {
        1 => Ok(records.remove(0)),
        0 => Err(ChainError::NotFound(format!("no action with hash {}", key))),
        n => Err(ChainError::NotFound(format!(
            "{} actions match hash {}",
            n, key
        ))),
    }
}

#[async_trait]
impl Client for IotexClient {
    type Tx = IotexTx;

    async fn tx(&self, hash: &[u8]) -> ChainResult<(IotexTx, u64)> {
        let result = self.lookup(hash).await;
        metrics::record_lookup(CHAIN, lookup_outcome(&result));
        result
    }

    async fn submit_tx(&self, tx: &IotexTx) -> ChainResult<()> {
        let action = tx.to_action()?;
        let conn = self.connection.connect().await?;
        let mut client = conn.client.clone();

        let request = conn.request(SendActionRequest {
            action: Some(action),
        });
        match client.send_action(request).await {
            Ok(response) => {
                metrics::record_submission(CHAIN, Outcome::Ok);
                tracing::info!(
                    connection_id = %conn.id,
                    action_hash = %response.get_ref().action_hash,
                    "Action submitted"
                );
                Ok(())
            }
            Err(status) => {
                conn.observe(&status);
                metrics::record_submission(CHAIN, Outcome::Rejected);
                tracing::warn!(
                    connection_id = %conn.id,
                    code = ?status.code(),
                    reason = %status.message(),
                    "Action rejected"
                );
                Err(ChainError::Submission(status.message().to_string()))
            }
        }
    }
}

#[async_trait]
impl GasPriceSource for IotexClient {
    fn chain(&self) -> &'static str {
        CHAIN
    }

    async fn suggest_gas_price(&self) -> ChainResult<U256> {
        let conn = self.connection.connect().await?;
        let mut client = conn.client.clone();
        let response = client
            .suggest_gas_price(conn.request(SuggestGasPriceRequest {}))
            .await
            .map_err(|status| rpc_error(&conn, status))?;
        Ok(U256::from(response.into_inner().gas_price))
    }
}
