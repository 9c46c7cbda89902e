//! The wallet provider seam: an EIP-1193-style `request` plus an event stream.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::TransportError;
use crate::transport::RpcTransport;

/// Events a wallet pushes to the client without being asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The wallet's exposed account list changed. Empty means the user
    /// disconnected or locked the wallet.
    AccountsChanged(Vec<String>),
}

/// An EIP-1193-style wallet provider.
///
/// `request` failures carry the provider error code
/// (see [`codes`](crate::error::codes)) inside [`TransportError::Rpc`].
#[async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Issue a provider request such as `eth_requestAccounts` or
    /// `eth_sendTransaction`.
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError>;

    /// Subscribe to wallet events. Each subscriber sees every event sent
    /// after it subscribed.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;

    /// Human-readable provider name, used in logs.
    fn name(&self) -> &str;
}

const EVENT_CAPACITY: usize = 16;

/// A wallet that forwards every request to an [`RpcTransport`].
///
/// Suitable for nodes that manage keys themselves (dev nodes, signers
/// exposing JSON-RPC). Events are injected with [`RpcWallet::emit`].
pub struct RpcWallet<T: RpcTransport> {
    transport: Arc<T>,
    next_id: AtomicU64,
    events: broadcast::Sender<WalletEvent>,
}

impl<T: RpcTransport> RpcWallet<T> {
    pub fn new(transport: Arc<T>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            transport,
            next_id: AtomicU64::new(1),
            events,
        }
    }

    /// Publish an event to all subscribers. Returns the number of receivers.
    pub fn emit(&self, event: WalletEvent) -> usize {
        self.events.send(event).unwrap_or(0)
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }
}

#[async_trait]
impl<T: RpcTransport> WalletProvider for RpcWallet<T> {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.transport.call::<Value>(id, method, params).await
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    fn name(&self) -> &str {
        self.transport.url()
    }
}
