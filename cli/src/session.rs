//! Read-only sessions against a live node.

use std::sync::Arc;

use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};

use paystream_client::{ConnectionManager, ContractGateway};
use paystream_core::{ClientConfig, NetworkName, SystemClock, TracingNotifier};
use paystream_rpc::{HttpRpcClient, WalletProvider, WatchOnlyWallet};

/// `PAYSTREAM_RPC_CELO_SEPOLIA` and friends override the built-in endpoint.
pub fn rpc_env_var(network: NetworkName) -> String {
    format!(
        "PAYSTREAM_RPC_{}",
        network.as_str().replace('-', "_").to_uppercase()
    )
}

/// Pick the RPC endpoint: flag, then environment, then the registry default.
pub fn resolve_rpc_url(network: NetworkName, flag: Option<&str>) -> Result<String> {
    if let Some(url) = flag {
        return Ok(url.to_string());
    }
    if let Ok(url) = std::env::var(rpc_env_var(network)) {
        return Ok(url);
    }
    network
        .descriptor()
        .primary_rpc_url()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("no RPC endpoint known for {network}"))
}

/// Connect a watch-only wallet for `account` and return a gateway over it.
pub async fn open(network: NetworkName, rpc: Option<&str>, account: Address) -> Result<ContractGateway> {
    let url = resolve_rpc_url(network, rpc)?;
    tracing::debug!(%network, %url, %account, "opening read-only session");

    let transport = Arc::new(HttpRpcClient::default_for(url.clone())?);
    let wallet: Arc<dyn WalletProvider> =
        Arc::new(WatchOnlyWallet::new(transport, account.to_string()));
    let manager = Arc::new(ConnectionManager::new(
        Some(wallet),
        Arc::new(TracingNotifier),
        ClientConfig::for_network(network),
    ));
    manager
        .connect()
        .await
        .with_context(|| format!("connecting to {network} via {url}"))?;

    Ok(ContractGateway::new(manager, Arc::new(SystemClock)))
}
