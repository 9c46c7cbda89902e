//! paystream-evm: the ABI layer of the stream client.
//!
//! - [`bindings`]: `sol!` bindings for the stream contract and ERC-20
//! - [`receipt`]: receipt/log types and `StreamCreated` extraction
//! - [`revert`]: `Error(string)` / `Panic(uint256)` revert decoding

pub mod bindings;
pub mod error;
pub mod receipt;
pub mod revert;

pub use bindings::{decode_returns, IPaymentStream, Stream, StreamEntry, IERC20};
pub use error::AbiError;
pub use receipt::{Log, TransactionReceipt};
pub use revert::{decode_revert, decode_revert_hex, reason_from_message, RevertReason};
