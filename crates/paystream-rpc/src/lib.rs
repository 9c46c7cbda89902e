//! paystream-rpc: the wallet provider seam and JSON-RPC plumbing.
//!
//! # Overview
//!
//! - [`WalletProvider`]: the EIP-1193-style request/event contract the
//!   client core depends on
//! - [`RpcTransport`]: async JSON-RPC transport, implemented by
//!   [`HttpRpcClient`]
//! - [`RpcWallet`] / [`WatchOnlyWallet`]: wallet adapters over a transport
//! - [`TransportError`]: structured error type with EIP-1193 code helpers

pub mod error;
pub mod http;
pub mod request;
pub mod transport;
pub mod wallet;
pub mod watch;

pub use error::{codes, TransportError};
pub use http::{HttpClientConfig, HttpRpcClient};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use transport::RpcTransport;
pub use wallet::{RpcWallet, WalletEvent, WalletProvider};
pub use watch::WatchOnlyWallet;
