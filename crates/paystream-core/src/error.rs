//! The client-wide failure taxonomy.

use thiserror::Error;

/// Every failure the connection manager and gateway report.
///
/// Precondition failures (`Validation`, `NotConnected`, `WalletNotDetected`,
/// `WrongNetwork`) are raised before any chain call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Bad input caught before any chain call.
    #[error("{0}")]
    Validation(String),

    /// The operation needs a connected wallet session.
    #[error("wallet is not connected")]
    NotConnected,

    /// No wallet provider is available in this environment.
    #[error("wallet not detected")]
    WalletNotDetected,

    /// The wallet is on a different chain than the active network.
    #[error("wallet is on chain {actual}, expected {expected}")]
    WrongNetwork { expected: u64, actual: u64 },

    /// The user declined the request in the wallet.
    #[error("request rejected in wallet: {0}")]
    UserRejected(String),

    /// The contract rejected the call. `reason` is the decoded revert reason
    /// when the node provided one.
    #[error("{}", .reason.as_deref().unwrap_or("transaction reverted"))]
    ChainRevert { reason: Option<String> },

    /// RPC / network failure.
    #[error("network error: {0}")]
    Transport(String),

    /// The requested stream does not exist.
    #[error("stream {0} not found")]
    NotFound(String),

    /// A confirmed creation receipt carried no `StreamCreated` event.
    #[error("Could not find StreamCreated event in transaction {tx_hash}.")]
    MissingEvent { tx_hash: String },

    /// Node data did not match the expected ABI or format.
    #[error("decode error: {0}")]
    Decode(String),
}

impl StreamError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn revert(reason: impl Into<String>) -> Self {
        Self::ChainRevert {
            reason: Some(reason.into()),
        }
    }

    /// Returns `true` if the failure happened before anything reached the chain.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotConnected | Self::WalletNotDetected | Self::WrongNetwork { .. }
        )
    }

    /// The revert reason, if this is a contract rejection that carried one.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Self::ChainRevert { reason } => reason.as_deref(),
            _ => None,
        }
    }
}
