//! Composition of raw contract reads into [`StreamDetails`].

use alloy_primitives::{Address, U256};

use paystream_core::{
    classify_token, native_meta, NetworkDescriptor, StreamDetails, StreamError, StreamId,
    StreamParts, TokenClass, TokenMeta,
};
use paystream_evm::Stream;

use crate::contracts::{Erc20Contract, StreamContract};
use crate::eth::Eth;

/// What to do when an ERC-20 token's metadata cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaFallback {
    /// Fail the whole read.
    Fail,
    /// Use `"Unknown"` / 18 decimals.
    Unknown,
}

fn timestamp(what: &str, v: U256) -> Result<u64, StreamError> {
    u64::try_from(v).map_err(|_| StreamError::Decode(format!("{what} {v} out of range")))
}

/// Convert a contract `Stream` record plus its withdrawable amount.
pub fn stream_parts(id: StreamId, raw: &Stream, withdrawable: U256) -> Result<StreamParts, StreamError> {
    Ok(StreamParts {
        id,
        sender: raw.sender,
        recipient: raw.recipient,
        token_address: raw.token,
        deposit: raw.deposit,
        withdrawn: raw.withdrawn,
        withdrawable,
        start_time: timestamp("start time", raw.startTime)?,
        stop_time: timestamp("stop time", raw.stopTime)?,
    })
}

/// Symbol and decimals for `token`. Native tokens never touch the chain.
pub async fn token_meta(
    eth: &Eth,
    network: &NetworkDescriptor,
    token: Address,
    from: Address,
    fallback: MetaFallback,
) -> Result<TokenMeta, StreamError> {
    let address = match classify_token(token, network) {
        TokenClass::Native => return Ok(native_meta(network)),
        TokenClass::Erc20(address) => address,
    };
    let erc20 = Erc20Contract::new(eth, address, from);
    match futures::try_join!(erc20.symbol(), erc20.decimals()) {
        Ok((symbol, decimals)) => Ok(TokenMeta { symbol, decimals }),
        Err(e) if fallback == MetaFallback::Unknown => {
            tracing::debug!(token = %address, error = %e, "token metadata unavailable");
            Ok(TokenMeta::unknown())
        }
        Err(e) => Err(e),
    }
}

/// Full read of one stream: withdrawable amount and token metadata on top of
/// an already fetched `Stream` record.
pub async fn resolve(
    contract: &StreamContract<'_>,
    eth: &Eth,
    network: &NetworkDescriptor,
    from: Address,
    id: StreamId,
    raw: &Stream,
    fallback: MetaFallback,
) -> Result<StreamDetails, StreamError> {
    let withdrawable = contract.withdrawable_amount(id).await?;
    let meta = token_meta(eth, network, raw.token, from, fallback).await?;
    Ok(StreamDetails::assemble(stream_parts(id, raw, withdrawable)?, meta))
}
