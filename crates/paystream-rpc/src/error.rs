//! Transport-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// EIP-1193 provider error codes the wallet layer reacts to.
pub mod codes {
    /// The user rejected the request in the wallet.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested method or account has not been authorized.
    pub const UNAUTHORIZED: i64 = 4100;
    /// The provider does not support the requested method.
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    /// The provider is disconnected from all chains.
    pub const DISCONNECTED: i64 = 4900;
    /// The chain id is not known to the wallet (`wallet_switchEthereumChain`).
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// Node-side execution error carrying revert data (`eth_call`, `eth_estimateGas`).
    pub const EXECUTION_REVERTED: i64 = 3;
}

/// Errors that can occur while talking to a wallet provider or RPC node.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, timeout, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC / EIP-1193 error object returned by the node or wallet.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Build a provider error with the given EIP-1193 code.
    pub fn provider(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc(JsonRpcError {
            code,
            message: message.into(),
            data: None,
        })
    }

    /// The JSON-RPC error code, if this is a protocol-level error.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc(err) => Some(err.code),
            _ => None,
        }
    }

    /// Returns `true` if the wallet user declined the request.
    pub fn is_user_rejection(&self) -> bool {
        self.code() == Some(codes::USER_REJECTED)
    }

    /// Returns `true` if the wallet does not know the requested chain.
    pub fn is_unrecognized_chain(&self) -> bool {
        self.code() == Some(codes::UNRECOGNIZED_CHAIN)
    }

    /// Returns `true` if this is a node-side execution error (not a transport failure).
    pub fn is_execution_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }

    /// Hex-encoded revert data attached to the error object, if any.
    ///
    /// Nodes disagree on where they put it: geth uses `data` directly,
    /// some wallets nest it as `data.data` or `data.originalError.data`.
    pub fn revert_data(&self) -> Option<&str> {
        let Self::Rpc(err) = self else {
            return None;
        };
        let data = err.data.as_ref()?;
        data.as_str()
            .or_else(|| data.get("data").and_then(|d| d.as_str()))
            .or_else(|| {
                data.get("originalError")
                    .and_then(|o| o.get("data"))
                    .and_then(|d| d.as_str())
            })
            .filter(|s| s.starts_with("0x"))
    }
}
