//! paystream-client: wallet connection and contract gateway for payment streams.
//!
//! # Overview
//!
//! - [`ConnectionManager`]: wallet session, active network, busy flag and
//!   state subscriptions
//! - [`ContractGateway`]: create / withdraw / cancel / top up streams and
//!   read the stream read model
//! - [`Eth`] and the contract handles in [`contracts`]: typed calls over any
//!   [`WalletProvider`](paystream_rpc::WalletProvider)
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use paystream_client::{ConnectionManager, ContractGateway};
//! use paystream_core::{ClientConfig, StreamId, SystemClock, TracingNotifier};
//! use paystream_rpc::{HttpRpcClient, WalletProvider, WatchOnlyWallet};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpRpcClient::default_for("https://forno.celo-sepolia.celo-testnet.org")?);
//! let wallet: Arc<dyn WalletProvider> =
//!     Arc::new(WatchOnlyWallet::new(transport, "0x00000000000000000000000000000000000000a1"));
//! let manager = Arc::new(ConnectionManager::new(
//!     Some(wallet),
//!     Arc::new(TracingNotifier),
//!     ClientConfig::default(),
//! ));
//! manager.connect().await?;
//!
//! let gateway = ContractGateway::new(manager, Arc::new(SystemClock));
//! if let Some(stream) = gateway.get_stream_details(StreamId(1)).await {
//!     println!("{} → {}", stream.sender, stream.recipient);
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod contracts;
pub mod errors;
pub mod eth;
pub mod gateway;
pub mod locks;
pub mod read_model;

pub use connection::{BusyGuard, ConnectionManager, ConnectionState, Session};
pub use contracts::{Erc20Contract, StreamContract};
pub use errors::classify;
pub use eth::Eth;
pub use gateway::{ContractGateway, CreateStreamParams};
pub use locks::StreamLocks;
