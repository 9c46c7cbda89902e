//! Contract handles for the stream contract and ERC-20 tokens.
//!
//! Handles borrow an [`Eth`] and are rebuilt from the current session on
//! every gateway call.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;

use paystream_core::{StreamError, StreamId};
use paystream_evm::{decode_returns, AbiError, IPaymentStream, Stream, StreamEntry, TransactionReceipt, IERC20};

use crate::eth::Eth;

fn abi_err(e: AbiError) -> StreamError {
    StreamError::Decode(e.to_string())
}

/// The deployed stream contract, bound to a sending account.
pub struct StreamContract<'a> {
    eth: &'a Eth,
    address: Address,
    from: Address,
}

impl<'a> StreamContract<'a> {
    pub fn new(eth: &'a Eth, address: Address, from: Address) -> Self {
        Self { eth, address, from }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn call<C: SolCall>(&self, call: C) -> Result<Bytes, StreamError> {
        self.eth.call(self.address, call.abi_encode().into()).await
    }

    async fn send<C: SolCall>(&self, call: C, value: Option<U256>) -> Result<TransactionReceipt, StreamError> {
        self.eth
            .transact(self.from, self.address, call.abi_encode().into(), value)
            .await
    }

    pub async fn get_stream(&self, id: StreamId) -> Result<Stream, StreamError> {
        let out = self
            .call(IPaymentStream::getStreamCall { streamId: id.as_u256() })
            .await?;
        decode_returns::<IPaymentStream::getStreamCall>(&out).map_err(abi_err)
    }

    pub async fn withdrawable_amount(&self, id: StreamId) -> Result<U256, StreamError> {
        let out = self
            .call(IPaymentStream::withdrawableAmountCall { streamId: id.as_u256() })
            .await?;
        decode_returns::<IPaymentStream::withdrawableAmountCall>(&out).map_err(abi_err)
    }

    pub async fn sender_streams(&self, sender: Address) -> Result<Vec<StreamEntry>, StreamError> {
        let out = self
            .call(IPaymentStream::getSenderStreamsCall { sender })
            .await?;
        decode_returns::<IPaymentStream::getSenderStreamsCall>(&out).map_err(abi_err)
    }

    pub async fn recipient_streams(&self, recipient: Address) -> Result<Vec<StreamEntry>, StreamError> {
        let out = self
            .call(IPaymentStream::getRecipientStreamsCall { recipient })
            .await?;
        decode_returns::<IPaymentStream::getRecipientStreamsCall>(&out).map_err(abi_err)
    }

    /// `createStream`; `value` carries the deposit for native-currency streams.
    pub async fn create_stream(
        &self,
        call: IPaymentStream::createStreamCall,
        value: Option<U256>,
    ) -> Result<TransactionReceipt, StreamError> {
        self.send(call, value).await
    }

    pub async fn withdraw(&self, id: StreamId, amount: U256) -> Result<TransactionReceipt, StreamError> {
        self.send(
            IPaymentStream::withdrawCall {
                streamId: id.as_u256(),
                amount,
            },
            None,
        )
        .await
    }

    pub async fn cancel_stream(&self, id: StreamId) -> Result<TransactionReceipt, StreamError> {
        self.send(IPaymentStream::cancelStreamCall { streamId: id.as_u256() }, None)
            .await
    }

    pub async fn top_up_stream(
        &self,
        id: StreamId,
        amount: U256,
        value: Option<U256>,
    ) -> Result<TransactionReceipt, StreamError> {
        self.send(
            IPaymentStream::topUpStreamCall {
                streamId: id.as_u256(),
                amount,
            },
            value,
        )
        .await
    }
}

/// An ERC-20 token contract, bound to a sending account.
pub struct Erc20Contract<'a> {
    eth: &'a Eth,
    address: Address,
    from: Address,
}

impl<'a> Erc20Contract<'a> {
    pub fn new(eth: &'a Eth, address: Address, from: Address) -> Self {
        Self { eth, address, from }
    }

    async fn call<C: SolCall>(&self, call: C) -> Result<Bytes, StreamError> {
        self.eth.call(self.address, call.abi_encode().into()).await
    }

    pub async fn symbol(&self) -> Result<String, StreamError> {
        let out = self.call(IERC20::symbolCall {}).await?;
        decode_returns::<IERC20::symbolCall>(&out).map_err(abi_err)
    }

    pub async fn decimals(&self) -> Result<u8, StreamError> {
        let out = self.call(IERC20::decimalsCall {}).await?;
        decode_returns::<IERC20::decimalsCall>(&out).map_err(abi_err)
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, StreamError> {
        let out = self.call(IERC20::balanceOfCall { account }).await?;
        decode_returns::<IERC20::balanceOfCall>(&out).map_err(abi_err)
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, StreamError> {
        let out = self.call(IERC20::allowanceCall { owner, spender }).await?;
        decode_returns::<IERC20::allowanceCall>(&out).map_err(abi_err)
    }

    /// `approve(spender, amount)`, awaited until confirmed.
    pub async fn approve(&self, spender: Address, amount: U256) -> Result<TransactionReceipt, StreamError> {
        self.eth
            .transact(
                self.from,
                self.address,
                IERC20::approveCall { spender, amount }.abi_encode().into(),
                None,
            )
            .await
    }
}
