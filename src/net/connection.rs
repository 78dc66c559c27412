//! Lazily established, self-healing node connection.
//!
//! # Responsibilities
//! - Dial on first use and share one physical connection between callers
//! - Detect connections whose transport has shut down and redial them
//! - Generate unique connection IDs for tracing
//!
//! # States
//! ```text
//! Disconnected ──connect()──▶ Connected ──transport shutdown──▶ Stale
//!                                 ▲                               │
//!                                 └──────────connect()────────────┘
//! ```
//!
//! The connect-or-reuse decision runs under one async mutex, so concurrent
//! callers never dial twice. Callers get a cloned handle and issue RPCs
//! without holding the lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::blockchain::types::ChainResult;
use crate::observability::metrics;

/// Global atomic counter for connection IDs.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a dialed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Observable state of a [`LazyConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nothing has been dialed yet.
    Disconnected,
    /// A live connection is held.
    Connected,
    /// A connection is held but its transport reported shutdown.
    Stale,
}

/// Terminal-status flag shared by every clone of a connection handle.
///
/// Transports trip it when a call fails at the transport level; once
/// tripped the connection is stale for good.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trip(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_tripped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A cheaply clonable handle to a physical connection.
pub trait Connection: Clone + Send + Sync + 'static {
    fn id(&self) -> ConnectionId;

    /// Whether the transport has reached a terminal state.
    fn is_shutdown(&self) -> bool;
}

/// Dials new connections for a [`LazyConnection`].
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    type Conn: Connection;

    /// Chain label used in logs and metrics.
    fn chain(&self) -> &'static str;

    /// Fails with [`ChainError::Connection`](crate::blockchain::ChainError::Connection).
    async fn dial(&self) -> ChainResult<Self::Conn>;
}

/// One shared connection, dialed on demand and replaced when stale.
pub struct LazyConnection<D: Dialer> {
    dialer: D,
    current: Mutex<Option<D::Conn>>,
}

impl<D: Dialer> LazyConnection<D> {
    pub fn new(dialer: D) -> Self {
        Self {
            dialer,
            current: Mutex::new(None),
        }
    }

    /// Return the live connection, dialing or redialing as needed.
    pub async fn connect(&self) -> ChainResult<D::Conn> {
        let mut current = self.current.lock().await;

        if let Some(conn) = current.as_ref() {
            if !conn.is_shutdown() {
                return Ok(conn.clone());
            }
            tracing::info!(
                chain = self.dialer.chain(),
                connection_id = %conn.id(),
                "Connection shut down, redialing"
            );
        }

        let conn = self.dialer.dial().await?;
        metrics::record_dial(self.dialer.chain());
        tracing::debug!(
            chain = self.dialer.chain(),
            connection_id = %conn.id(),
            "Connection established"
        );

        *current = Some(conn.clone());
        Ok(conn)
    }

    pub async fn state(&self) -> ConnectionState {
        match self.current.lock().await.as_ref() {
            None => ConnectionState::Disconnected,
            Some(conn) if conn.is_shutdown() => ConnectionState::Stale,
            Some(_) => ConnectionState::Connected,
        }
    }

    pub fn dialer(&self) -> &D {
        &self.dialer
    }
}

impl<D: Dialer + std::fmt::Debug> std::fmt::Debug for LazyConnection<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyConnection")
            .field("dialer", &self.dialer)
            .finish_non_exhaustive()
    }
}
