//! Node client contract.
//!
//! # Responsibilities
//! - Submit signed transactions, surfacing the node's rejection text verbatim
//! - Look up a transaction by hash together with its confirmation count
//!
//! Clients perform no retries of their own. The single internal recovery is
//! redialing a connection whose transport has shut down.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::blockchain::transaction::Tx;
use crate::blockchain::types::ChainResult;

/// Submission and lookup against one chain node.
#[async_trait]
pub trait Client: Send + Sync {
    type Tx: Tx;

    /// Look up a transaction by its chain hash.
    ///
    /// Fails with [`ChainError::NotFound`](crate::blockchain::ChainError::NotFound)
    /// when zero or more than one record matches.
    async fn tx(&self, hash: &[u8]) -> ChainResult<(Self::Tx, u64)>;

    /// Submit a signed transaction.
    async fn submit_tx(&self, tx: &Self::Tx) -> ChainResult<()>;
}

/// How a client reaches its node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ClientOptions {
    /// Node endpoint, with or without scheme.
    pub endpoint: String,

    /// Dial with TLS.
    pub secure: bool,

    /// Optional bearer token sent with every call.
    pub auth_token: Option<String>,
}

impl ClientOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            secure: false,
            auth_token: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Endpoint as a URL, adding `http://` or `https://` when the configured
    /// value has no scheme.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            return self.endpoint.clone();
        }
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}", scheme, self.endpoint)
    }

    /// The `Authorization` header value, if a token is configured.
    pub fn bearer(&self) -> Option<String> {
        self.auth_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t))
    }
}
