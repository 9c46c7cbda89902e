//! Wallet connection lifecycle and active-network selection.
//!
//! State machine:
//!
//! ```text
//! Disconnected --connect--> Connected
//! Connected --switch_network ok | accounts cleared | disconnect--> Disconnected
//! Connected --accounts changed--> Connected (new account)
//! Connected --accounts changed, reconnect fails--> Disconnected
//! ```
//!
//! Every change is published through a `tokio::sync::watch` channel.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy_primitives::Address;
use serde_json::json;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use paystream_core::{
    ClientConfig, NetworkDescriptor, NetworkName, NotificationKind, Notifier, StreamError,
    TokenDescriptor,
};
use paystream_rpc::{WalletEvent, WalletProvider};

use crate::errors::classify;
use crate::eth::Eth;

/// A live wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account: Address,
    pub chain_id: u64,
}

/// Observable connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub network: NetworkName,
    pub session: Option<Session>,
    /// Advisory: true while any operation is in flight.
    pub busy: bool,
}

impl ConnectionState {
    pub fn disconnected(network: NetworkName) -> Self {
        Self {
            network,
            session: None,
            busy: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn account(&self) -> Option<Address> {
        self.session.map(|s| s.account)
    }
}

/// Owns the wallet connection and the active network.
pub struct ConnectionManager {
    wallet: Option<Arc<dyn WalletProvider>>,
    notifier: Arc<dyn Notifier>,
    config: ClientConfig,
    state: watch::Sender<ConnectionState>,
    in_flight: AtomicUsize,
}

/// Keeps `busy` set while alive. Overlapping guards keep it set until the
/// last one drops.
pub struct BusyGuard<'a> {
    manager: &'a ConnectionManager,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.manager.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.manager.sync_busy();
    }
}

impl ConnectionManager {
    /// Create a disconnected manager. `wallet` is `None` when no provider is
    /// available in this environment.
    pub fn new(
        wallet: Option<Arc<dyn WalletProvider>>,
        notifier: Arc<dyn Notifier>,
        config: ClientConfig,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::disconnected(config.default_network));
        Self {
            wallet,
            notifier,
            config,
            state,
            in_flight: AtomicUsize::new(0),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_connected()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session
    }

    pub fn network(&self) -> NetworkName {
        self.state.borrow().network
    }

    pub fn active_network(&self) -> &'static NetworkDescriptor {
        self.network().descriptor()
    }

    pub fn active_tokens(&self) -> &'static [TokenDescriptor] {
        self.active_network().tokens
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn wallet(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.wallet.as_ref()
    }

    pub(crate) fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Number of operations currently holding a [`BusyGuard`].
    pub fn operations_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Mark an operation as in flight until the guard drops.
    pub fn begin_operation(&self) -> BusyGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.sync_busy();
        BusyGuard { manager: self }
    }

    // The counter is re-read under the channel's write lock so racing
    // guards cannot leave a stale flag behind.
    fn sync_busy(&self) {
        self.state.send_if_modified(|s| {
            let busy = self.in_flight.load(Ordering::SeqCst) > 0;
            std::mem::replace(&mut s.busy, busy) != busy
        });
    }

    fn eth(&self, wallet: &Arc<dyn WalletProvider>) -> Eth {
        Eth::new(wallet.clone(), self.config.receipt_poll_interval())
    }

    fn notify(&self, message: &str, kind: NotificationKind) {
        self.notifier.notify(message, kind);
    }

    fn require_wallet(&self) -> Result<Arc<dyn WalletProvider>, StreamError> {
        match &self.wallet {
            Some(w) => Ok(w.clone()),
            None => {
                self.notify(
                    "Wallet not detected. Please install a Web3 wallet.",
                    NotificationKind::Error,
                );
                Err(StreamError::WalletNotDetected)
            }
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Request account access and open a session on the active network.
    ///
    /// Fails without touching state if the wallet is on another chain.
    pub async fn connect(&self) -> Result<Session, StreamError> {
        let wallet = self.require_wallet()?;
        let _busy = self.begin_operation();
        let network = self.active_network();
        let eth = self.eth(&wallet);

        let result: Result<Session, StreamError> = async {
            let accounts = eth.request_accounts().await?;
            let account = accounts.first().copied().ok_or(StreamError::NotConnected)?;
            let chain_id = eth.chain_id().await?;
            if chain_id != network.chain_id {
                return Err(StreamError::WrongNetwork {
                    expected: network.chain_id,
                    actual: chain_id,
                });
            }
            Ok(Session { account, chain_id })
        }
        .await;

        match result {
            Ok(session) => {
                self.state.send_modify(|s| s.session = Some(session));
                tracing::info!(
                    account = %session.account,
                    chain_id = session.chain_id,
                    network = %network.name,
                    "wallet connected"
                );
                self.notify("Wallet connected successfully!", NotificationKind::Success);
                Ok(session)
            }
            Err(e @ StreamError::WrongNetwork { .. }) => {
                tracing::warn!(error = %e, network = %network.name, "wallet on wrong chain");
                self.notify(
                    &format!("Please switch your wallet to {}.", network.display_name),
                    NotificationKind::Error,
                );
                Err(e)
            }
            Err(e) => {
                tracing::warn!(error = %e, "wallet connection failed");
                self.notify("Failed to connect wallet.", NotificationKind::Error);
                Err(e)
            }
        }
    }

    /// Switch the wallet to `target`, registering the chain first if the
    /// wallet does not know it. On success the session is cleared.
    pub async fn switch_network(&self, target: NetworkName) -> Result<(), StreamError> {
        let wallet = self.require_wallet()?;
        let _busy = self.begin_operation();
        let desc = target.descriptor();
        let switch_params = vec![json!({ "chainId": desc.chain_id_hex() })];

        let added = match wallet
            .request("wallet_switchEthereumChain", switch_params.clone())
            .await
        {
            Ok(_) => false,
            Err(e) if e.is_unrecognized_chain() => {
                tracing::info!(chain_id = desc.chain_id, "chain unknown to wallet, adding");
                if let Err(e) = wallet
                    .request("wallet_addEthereumChain", vec![desc.add_chain_params()])
                    .await
                {
                    tracing::warn!(error = %e, chain_id = desc.chain_id, "add chain failed");
                    self.notify(&format!("Failed to add {}.", desc.display_name), NotificationKind::Error);
                    return Err(classify(e));
                }
                if let Err(e) = wallet.request("wallet_switchEthereumChain", switch_params).await {
                    tracing::warn!(error = %e, chain_id = desc.chain_id, "switch after add failed");
                    self.notify(
                        &format!("Failed to switch to {}.", desc.display_name),
                        NotificationKind::Error,
                    );
                    return Err(classify(e));
                }
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, chain_id = desc.chain_id, "switch chain failed");
                self.notify(
                    &format!("Failed to switch to {}.", desc.display_name),
                    NotificationKind::Error,
                );
                return Err(classify(e));
            }
        };

        self.state.send_modify(|s| {
            s.network = target;
            s.session = None;
        });
        tracing::info!(network = %target, chain_id = desc.chain_id, added, "network switched");
        let message = if added {
            format!("Added and switched to {}. Please reconnect wallet.", desc.display_name)
        } else {
            format!("Switched to {}. Please reconnect wallet.", desc.display_name)
        };
        self.notify(&message, NotificationKind::Success);
        Ok(())
    }

    /// Clear the session. The active network is kept.
    pub fn disconnect(&self) {
        self.state.send_if_modified(|s| s.session.take().is_some());
    }

    /// React to a wallet-initiated event.
    pub async fn handle_wallet_event(&self, event: WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) if accounts.is_empty() => {
                tracing::info!("wallet reported no accounts, disconnecting");
                self.disconnect();
                self.notify("Wallet disconnected.", NotificationKind::Success);
            }
            WalletEvent::AccountsChanged(accounts) => {
                tracing::info!(accounts = accounts.len(), "wallet accounts changed, reconnecting");
                // the old session belongs to an account the wallet no longer exposes
                if let Err(e) = self.connect().await {
                    tracing::warn!(error = %e, "reconnect after account change failed");
                    self.disconnect();
                }
            }
        }
    }

    /// Forward the wallet's event stream into [`handle_wallet_event`] on a
    /// background task. Returns `None` without a wallet.
    ///
    /// [`handle_wallet_event`]: ConnectionManager::handle_wallet_event
    pub fn listen(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut events = self.wallet.as_ref()?.subscribe();
        let manager = Arc::clone(self);
        Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => manager.handle_wallet_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "wallet event listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }))
    }
}
