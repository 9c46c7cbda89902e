//! Token classification: the single place that decides whether a token is
//! the network's native currency or an ERC-20 contract.

use alloy_primitives::Address;

use crate::error::StreamError;
use crate::network::{NetworkDescriptor, TokenAddress};

/// How a stream's token is paid and read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Native currency: value transfer on write, fixed metadata on read.
    Native,
    Erc20(Address),
}

/// Display metadata for a stream's token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMeta {
    pub symbol: String,
    pub decimals: u8,
}

impl TokenMeta {
    pub fn unknown() -> Self {
        Self {
            symbol: "Unknown".into(),
            decimals: 18,
        }
    }
}

/// Classify an on-chain token address read back from the stream contract.
///
/// The zero address only means "native" on networks that support native
/// streams; elsewhere it is treated as a (broken) ERC-20 address.
pub fn classify_token(address: Address, network: &NetworkDescriptor) -> TokenClass {
    if address == Address::ZERO && network.supports_native_streams() {
        TokenClass::Native
    } else {
        TokenClass::Erc20(address)
    }
}

/// Classify a token chosen for a new stream.
pub fn classify_selection(
    token: TokenAddress,
    network: &NetworkDescriptor,
) -> Result<TokenClass, StreamError> {
    match token {
        TokenAddress::Native if network.supports_native_streams() => Ok(TokenClass::Native),
        TokenAddress::Native => Err(StreamError::validation(format!(
            "{} does not support native-currency streams",
            network.display_name
        ))),
        TokenAddress::Contract(a) if a == Address::ZERO => Err(StreamError::validation(
            "token address cannot be the zero address",
        )),
        TokenAddress::Contract(a) => Ok(classify_token(a, network)),
    }
}

/// Metadata for a native-currency stream; no contract call involved.
pub fn native_meta(network: &NetworkDescriptor) -> TokenMeta {
    TokenMeta {
        symbol: network.native_currency.symbol.to_string(),
        decimals: network.native_currency.decimals,
    }
}
