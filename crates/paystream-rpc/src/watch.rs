//! A read-only wallet bound to a fixed account.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::error::{codes, TransportError};
use crate::transport::RpcTransport;
use crate::wallet::{RpcWallet, WalletEvent, WalletProvider};

/// Methods that need a key. A watch-only wallet refuses them.
const SIGNING_METHODS: &[&str] = &[
    "eth_sendTransaction",
    "eth_sign",
    "personal_sign",
    "eth_signTypedData_v4",
];

/// Wallet that exposes one account and forwards reads to a node.
///
/// Used by the CLI and other read-only sessions: `eth_requestAccounts` is
/// answered locally, signing is refused with `4100 Unauthorized` and chain
/// management with `4200 Unsupported`.
pub struct WatchOnlyWallet<T: RpcTransport> {
    inner: RpcWallet<T>,
    account: String,
}

impl<T: RpcTransport> WatchOnlyWallet<T> {
    pub fn new(transport: Arc<T>, account: impl Into<String>) -> Self {
        Self {
            inner: RpcWallet::new(transport),
            account: account.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}

#[async_trait]
impl<T: RpcTransport> WalletProvider for WatchOnlyWallet<T> {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        match method {
            "eth_requestAccounts" | "eth_accounts" => Ok(json!([self.account])),
            m if SIGNING_METHODS.contains(&m) => Err(TransportError::provider(
                codes::UNAUTHORIZED,
                format!("{m} is not available on a watch-only wallet"),
            )),
            "wallet_switchEthereumChain" | "wallet_addEthereumChain" => Err(
                TransportError::provider(codes::UNSUPPORTED_METHOD, format!("{method} is not supported")),
            ),
            _ => self.inner.request(method, params).await,
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.inner.subscribe()
    }

    fn name(&self) -> &str {
        "watch-only"
    }
}
