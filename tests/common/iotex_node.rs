//! In-memory `iotexapi.APIService` served over tonic.

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::future::{ready, Ready};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chain_adapter::chains::iotex::proto::{
    get_actions_request, Action, ActionInfo, ChainMeta, GetActionsRequest, GetActionsResponse,
    GetChainMetaRequest, GetChainMetaResponse, SendActionRequest, SendActionResponse,
    SuggestGasPriceRequest, SuggestGasPriceResponse,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tonic::body::BoxBody;
use tonic::codec::ProstCodec;
use tonic::codegen::{empty_body, http, Body, BoxFuture, Context, Poll, Service, StdError};
use tonic::server::{Grpc, NamedService};
use tonic::transport::server::TcpIncoming;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

/// Node state the tests script and inspect.
#[derive(Default)]
pub struct MockIotexNode {
    pub height: AtomicU64,
    pub gas_price: AtomicU64,
    /// Status message returned by `SendAction`, if set.
    pub reject_with: Mutex<Option<String>>,
    /// Answer the next `GetChainMeta` with `Unavailable`.
    pub unavailable_once: AtomicBool,
    pub sent: Mutex<Vec<Action>>,
    pub authorization: Mutex<Vec<Option<String>>>,
    /// Peer address of every call, one entry per call.
    pub peers: Mutex<Vec<SocketAddr>>,
    /// `GetActions` answers by hex hash; a missing key is a `NotFound` status.
    actions: Mutex<HashMap<String, Vec<ActionInfo>>>,
}

impl MockIotexNode {
    /// Answer lookups of `hash` with `infos`, which may hold zero or several records.
    pub fn include(&self, hash: &[u8], infos: Vec<ActionInfo>) {
        self.actions.lock().unwrap().insert(hex::encode(hash), infos);
    }

    /// Distinct client connections seen so far.
    pub fn connections(&self) -> usize {
        self.peers.lock().unwrap().iter().collect::<HashSet<_>>().len()
    }

    fn observe<T>(&self, request: &Request<T>) {
        self.authorization.lock().unwrap().push(
            request
                .metadata()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
        if let Some(peer) = request.remote_addr() {
            self.peers.lock().unwrap().push(peer);
        }
    }

    fn send_action(
        &self,
        request: Request<SendActionRequest>,
    ) -> Result<Response<SendActionResponse>, Status> {
        self.observe(&request);
        if let Some(reason) = self.reject_with.lock().unwrap().clone() {
            return Err(Status::invalid_argument(reason));
        }
        let action = request
            .into_inner()
            .action
            .ok_or_else(|| Status::invalid_argument("missing action"))?;
        self.sent.lock().unwrap().push(action);
        Ok(Response::new(SendActionResponse {
            action_hash: "mock-action".to_string(),
        }))
    }

    fn get_actions(
        &self,
        request: Request<GetActionsRequest>,
    ) -> Result<Response<GetActionsResponse>, Status> {
        self.observe(&request);
        let hash = match request.into_inner().lookup {
            Some(get_actions_request::Lookup::ByHash(by_hash)) => by_hash.action_hash,
            None => return Err(Status::invalid_argument("missing lookup")),
        };
        match self.actions.lock().unwrap().get(&hash) {
            Some(infos) => Ok(Response::new(GetActionsResponse {
                total: infos.len() as u64,
                action_info: infos.clone(),
            })),
            None => Err(Status::not_found(format!("action {} not found", hash))),
        }
    }

    fn get_chain_meta(
        &self,
        request: Request<GetChainMetaRequest>,
    ) -> Result<Response<GetChainMetaResponse>, Status> {
        self.observe(&request);
        if self.unavailable_once.swap(false, Ordering::SeqCst) {
            return Err(Status::unavailable("node is restarting"));
        }
        Ok(Response::new(GetChainMetaResponse {
            chain_meta: Some(ChainMeta {
                height: self.height.load(Ordering::SeqCst),
            }),
        }))
    }

    fn suggest_gas_price(
        &self,
        request: Request<SuggestGasPriceRequest>,
    ) -> Result<Response<SuggestGasPriceResponse>, Status> {
        self.observe(&request);
        Ok(Response::new(SuggestGasPriceResponse {
            gas_price: self.gas_price.load(Ordering::SeqCst),
        }))
    }
}

type Handler<Req, Resp> = fn(&MockIotexNode, Request<Req>) -> Result<Response<Resp>, Status>;

/// One RPC method bound to the shared node.
struct Unary<Req, Resp> {
    node: Arc<MockIotexNode>,
    handler: Handler<Req, Resp>,
}

impl<Req, Resp> Service<Request<Req>> for Unary<Req, Resp> {
    type Response = Response<Resp>;
    type Error = Status;
    type Future = Ready<Result<Response<Resp>, Status>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Status>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Req>) -> Self::Future {
        ready((self.handler)(&self.node, request))
    }
}

fn unary<B, Req, Resp>(
    request: http::Request<B>,
    node: Arc<MockIotexNode>,
    handler: Handler<Req, Resp>,
) -> BoxFuture<http::Response<BoxBody>, Infallible>
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
    Req: prost::Message + Default + Send + 'static,
    Resp: prost::Message + Send + 'static,
{
    Box::pin(async move {
        let mut grpc = Grpc::new(ProstCodec::<Resp, Req>::default());
        Ok(grpc.unary(Unary { node, handler }, request).await)
    })
}

#[derive(Clone)]
struct ApiService {
    node: Arc<MockIotexNode>,
}

impl<B> Service<http::Request<B>> for ApiService
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<BoxBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<B>) -> Self::Future {
        let node = self.node.clone();
        match request.uri().path() {
            "/iotexapi.APIService/SendAction" => {
                unary(request, node, MockIotexNode::send_action)
            }
            "/iotexapi.APIService/GetActions" => {
                unary(request, node, MockIotexNode::get_actions)
            }
            "/iotexapi.APIService/GetChainMeta" => {
                unary(request, node, MockIotexNode::get_chain_meta)
            }
            "/iotexapi.APIService/SuggestGasPrice" => {
                unary(request, node, MockIotexNode::suggest_gas_price)
            }
            _ => Box::pin(async move {
                let mut response = http::Response::new(empty_body());
                let headers = response.headers_mut();
                headers.insert(Status::GRPC_STATUS, (tonic::Code::Unimplemented as i32).into());
                headers.insert(
                    http::header::CONTENT_TYPE,
                    tonic::metadata::GRPC_CONTENT_TYPE,
                );
                Ok(response)
            }),
        }
    }
}

impl NamedService for ApiService {
    const NAME: &'static str = "iotexapi.APIService";
}

/// Start a fresh node on an ephemeral port.
pub async fn start_mock_iotex() -> (Arc<MockIotexNode>, SocketAddr, JoinHandle<()>) {
    let node = Arc::new(MockIotexNode::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let incoming = TcpIncoming::from_listener(listener, true, None).unwrap();

    let service = ApiService { node: node.clone() };
    let handle = tokio::spawn(async move {
        let _ = Server::builder()
            .add_service(service)
            .serve_with_incoming(incoming)
            .await;
    });
    (node, addr, handle)
}
