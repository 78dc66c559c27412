//! Protobuf messages and unary gRPC client for the IoTeX API.
//!
//! Only the subset of `iotextypes` / `iotexapi` needed for transfers is
//! declared. Field tags match the upstream `.proto` definitions, so encodings
//! are byte-compatible with the node.

use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::{Request, Response, Status};

/// `iotextypes.Transfer`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transfer {
    /// Amount in Rau as a decimal string.
    #[prost(string, tag = "1")]
    pub amount: String,
    #[prost(string, tag = "2")]
    pub recipient: String,
    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
}

/// `iotextypes.ActionCore`, the signed portion of an action.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActionCore {
    #[prost(uint32, tag = "1")]
    pub version: u32,
    #[prost(uint64, tag = "2")]
    pub nonce: u64,
    #[prost(uint64, tag = "3")]
    pub gas_limit: u64,
    /// Gas price in Rau as a decimal string.
    #[prost(string, tag = "4")]
    pub gas_price: String,
    #[prost(uint32, tag = "5")]
    pub chain_id: u32,
    #[prost(oneof = "action_core::Action", tags = "10")]
    pub action: Option<action_core::Action>,
}

pub mod action_core {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Action {
        #[prost(message, tag = "10")]
        Transfer(super::Transfer),
    }
}

/// `iotextypes.Action`, the signed envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Action {
    #[prost(message, optional, tag = "1")]
    pub core: Option<ActionCore>,
    /// Uncompressed secp256k1 public key.
    #[prost(bytes = "vec", tag = "2")]
    pub sender_pub_key: Vec<u8>,
    /// `r || s || v`, `v` in {0, 1}.
    #[prost(bytes = "vec", tag = "3")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActionInfo {
    #[prost(message, optional, tag = "1")]
    pub action: Option<Action>,
    #[prost(string, tag = "2")]
    pub act_hash: String,
    #[prost(string, tag = "3")]
    pub blk_hash: String,
    #[prost(uint64, tag = "5")]
    pub blk_height: u64,
    #[prost(string, tag = "6")]
    pub sender: String,
    #[prost(string, tag = "7")]
    pub gas_fee: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendActionRequest {
    #[prost(message, optional, tag = "1")]
    pub action: Option<Action>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendActionResponse {
    #[prost(string, tag = "1")]
    pub action_hash: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetActionByHashRequest {
    /// Hex action hash, no `0x` prefix.
    #[prost(string, tag = "1")]
    pub action_hash: String,
    #[prost(bool, tag = "2")]
    pub check_pending: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetActionsRequest {
    #[prost(oneof = "get_actions_request::Lookup", tags = "2")]
    pub lookup: Option<get_actions_request::Lookup>,
}

pub mod get_actions_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Lookup {
        #[prost(message, tag = "2")]
        ByHash(super::GetActionByHashRequest),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetActionsResponse {
    #[prost(uint64, tag = "1")]
    pub total: u64,
    #[prost(message, repeated, tag = "2")]
    pub action_info: Vec<ActionInfo>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetChainMetaRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChainMeta {
    #[prost(uint64, tag = "1")]
    pub height: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetChainMetaResponse {
    #[prost(message, optional, tag = "1")]
    pub chain_meta: Option<ChainMeta>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SuggestGasPriceRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SuggestGasPriceResponse {
    #[prost(uint64, tag = "1")]
    pub gas_price: u64,
}

/// Unary client for `iotexapi.APIService`.
#[derive(Debug, Clone)]
pub struct ApiServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl ApiServiceClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    pub async fn send_action(
        &mut self,
        request: Request<SendActionRequest>,
    ) -> Result<Response<SendActionResponse>, Status> {
        self.unary(request, "/iotexapi.APIService/SendAction").await
    }

    pub async fn get_actions(
        &mut self,
        request: Request<GetActionsRequest>,
    ) -> Result<Response<GetActionsResponse>, Status> {
        self.unary(request, "/iotexapi.APIService/GetActions").await
    }

    pub async fn get_chain_meta(
        &mut self,
        request: Request<GetChainMetaRequest>,
    ) -> Result<Response<GetChainMetaResponse>, Status> {
        self.unary(request, "/iotexapi.APIService/GetChainMeta").await
    }

    pub async fn suggest_gas_price(
        &mut self,
        request: Request<SuggestGasPriceRequest>,
    ) -> Result<Response<SuggestGasPriceResponse>, Status> {
        self.unary(request, "/iotexapi.APIService/SuggestGasPrice").await
    }

    async fn unary<Req, Resp>(
        &mut self,
        request: Request<Req>,
        path: &'static str,
    ) -> Result<Response<Resp>, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unavailable(format!("service was not ready: {}", e)))?;
        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        self.inner
            .unary(request, PathAndQuery::from_static(path), codec)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_action_core_field_layout() {
        let core = ActionCore {
            version: 1,
            nonce: 132,
            gas_limit: 1_000_000,
            gas_price: "100000000000".to_string(),
            chain_id: 1,
            action: Some(action_core::Action::Transfer(Transfer {
                amount: "1".to_string(),
                recipient: "io1".to_string(),
                payload: Vec::new(),
            })),
        };
        let bytes = core.encode_to_vec();

        // version, nonce, gasLimit, gasPrice, chainID, transfer (field 10)
        assert_eq!(&bytes[..2], &[0x08, 0x01]);
        assert_eq!(&bytes[2..5], &[0x10, 0x84, 0x01]);
        assert!(bytes.windows(2).any(|w| w == [0x28, 0x01]));
        assert!(bytes.contains(&0x52));

        assert_eq!(ActionCore::decode(bytes.as_slice()).unwrap(), core);
    }

    #[test]
    fn test_get_actions_by_hash_encoding() {
        let request = GetActionsRequest {
            lookup: Some(get_actions_request::Lookup::ByHash(GetActionByHashRequest {
                action_hash: "ab".to_string(),
                check_pending: false,
            })),
        };
        // field 2, length 4, inner field 1 "ab"
        assert_eq!(request.encode_to_vec(), vec![0x12, 0x04, 0x0a, 0x02, b'a', b'b']);
    }
}
