//! Typed `eth_*` requests over a wallet provider.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde_json::{json, Value};

use paystream_core::StreamError;
use paystream_evm::TransactionReceipt;
use paystream_rpc::WalletProvider;

use crate::errors::classify;

/// Thin typed layer over [`WalletProvider::request`].
#[derive(Clone)]
pub struct Eth {
    wallet: Arc<dyn WalletProvider>,
    poll_interval: Duration,
}

impl Eth {
    pub fn new(wallet: Arc<dyn WalletProvider>, poll_interval: Duration) -> Self {
        Self {
            wallet,
            poll_interval,
        }
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, StreamError> {
        tracing::trace!(method, wallet = self.wallet.name(), "wallet request");
        self.wallet.request(method, params).await.map_err(classify)
    }

    fn decode<T: serde::de::DeserializeOwned>(what: &str, value: Value) -> Result<T, StreamError> {
        serde_json::from_value(value).map_err(|e| StreamError::Decode(format!("{what}: {e}")))
    }

    /// `eth_requestAccounts`.
    pub async fn request_accounts(&self) -> Result<Vec<Address>, StreamError> {
        let raw = self.request("eth_requestAccounts", vec![]).await?;
        Self::decode("accounts", raw)
    }

    /// `eth_chainId` as a number.
    pub async fn chain_id(&self) -> Result<u64, StreamError> {
        let raw = self.request("eth_chainId", vec![]).await?;
        let id: U64 = Self::decode("chain id", raw)?;
        Ok(id.to::<u64>())
    }

    /// `eth_getBalance` at the latest block.
    pub async fn balance(&self, address: Address) -> Result<U256, StreamError> {
        let raw = self
            .request("eth_getBalance", vec![json!(address), json!("latest")])
            .await?;
        Self::decode("balance", raw)
    }

    /// `eth_call` against the latest block, returning the raw return data.
    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, StreamError> {
        let raw = self
            .request("eth_call", vec![json!({ "to": to, "data": data }), json!("latest")])
            .await?;
        Self::decode("call result", raw)
    }

    /// `eth_sendTransaction` from the connected account. Returns the tx hash.
    pub async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        value: Option<U256>,
    ) -> Result<B256, StreamError> {
        let mut tx = json!({ "from": from, "to": to, "data": data });
        if let Some(value) = value {
            tx["value"] = json!(value);
        }
        let raw = self.request("eth_sendTransaction", vec![tx]).await?;
        Self::decode("transaction hash", raw)
    }

    /// Poll `eth_getTransactionReceipt` until the transaction is mined.
    pub async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, StreamError> {
        loop {
            let raw = self
                .request("eth_getTransactionReceipt", vec![json!(tx_hash)])
                .await?;
            if !raw.is_null() {
                return Self::decode("receipt", raw);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Submit a transaction, await its receipt and fail on a reverted status.
    pub async fn transact(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        value: Option<U256>,
    ) -> Result<TransactionReceipt, StreamError> {
        let tx_hash = self.send_transaction(from, to, data, value).await?;
        tracing::debug!(%tx_hash, %to, "transaction submitted");

        let receipt = self.wait_for_receipt(tx_hash).await?;
        if !receipt.succeeded() {
            tracing::warn!(%tx_hash, "transaction reverted");
            return Err(StreamError::ChainRevert { reason: None });
        }
        tracing::debug!(%tx_hash, block = ?receipt.block_number, "transaction confirmed");
        Ok(receipt)
    }
}
