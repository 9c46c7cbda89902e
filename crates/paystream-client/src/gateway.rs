//! Typed async operations over the stream contract.
//!
//! Every operation needs a connected session and derives fresh contract
//! handles from it. Mutations submit a transaction, wait for the receipt and
//! report the outcome to the notifier. Reads report nothing and degrade to
//! `None` / zero where the caller only needs a display value.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use tokio::sync::Mutex;

use paystream_core::{
    classify_selection, classify_token, native_meta, Clock, NetworkDescriptor, NotificationKind,
    StreamDetails, Role, StreamError, StreamId, TokenAddress, TokenClass, TokenMeta, UserStreamEntry,
};
use paystream_evm::IPaymentStream;

use crate::connection::ConnectionManager;
use crate::contracts::{Erc20Contract, StreamContract};
use crate::eth::Eth;
use crate::locks::StreamLocks;
use crate::read_model::{self, MetaFallback};

/// Parameters of a new stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStreamParams {
    pub recipient: Address,
    pub token: TokenAddress,
    /// Deposit in the token's base units.
    pub deposit: U256,
    /// Unix seconds.
    pub start_time: u64,
    /// Unix seconds.
    pub stop_time: u64,
}

/// Revert reasons the index reads use for "this address has no streams".
const NO_SENDER_STREAMS: &str = "no streams for sender";
const NO_RECIPIENT_STREAMS: &str = "no streams for recipient";

/// Everything a single call needs, derived from the current session.
struct CallContext {
    eth: Eth,
    account: Address,
    network: &'static NetworkDescriptor,
}

impl CallContext {
    fn stream(&self) -> StreamContract<'_> {
        StreamContract::new(&self.eth, self.network.stream_contract, self.account)
    }

    fn erc20(&self, token: Address) -> Erc20Contract<'_> {
        Erc20Contract::new(&self.eth, token, self.account)
    }
}

/// The contract gateway.
pub struct ContractGateway {
    connection: Arc<ConnectionManager>,
    clock: Arc<dyn Clock>,
    stream_locks: StreamLocks,
    create_lock: Mutex<()>,
}

impl ContractGateway {
    pub fn new(connection: Arc<ConnectionManager>, clock: Arc<dyn Clock>) -> Self {
        Self {
            connection,
            clock,
            stream_locks: StreamLocks::new(),
            create_lock: Mutex::new(()),
        }
    }

    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.connection
    }

    fn context(&self) -> Result<CallContext, StreamError> {
        let state = self.connection.state();
        let session = state.session.ok_or(StreamError::NotConnected)?;
        let wallet = self.connection.wallet().ok_or(StreamError::NotConnected)?;
        Ok(CallContext {
            eth: Eth::new(wallet.clone(), self.connection.config().receipt_poll_interval()),
            account: session.account,
            network: state.network.descriptor(),
        })
    }

    fn notify(&self, message: &str, kind: NotificationKind) {
        self.connection.notifier().notify(message, kind);
    }

    /// Report a mutation's outcome and hand the result back.
    fn report<T>(
        &self,
        op: &'static str,
        result: Result<T, StreamError>,
        success: impl FnOnce(&T) -> String,
    ) -> Result<T, StreamError> {
        match &result {
            Ok(v) => self.notify(&success(v), NotificationKind::Success),
            Err(e) => {
                tracing::warn!(op, error = %e, "stream operation failed");
                self.notify(&e.to_string(), NotificationKind::Error);
            }
        }
        result
    }

    fn validate_create(&self, p: &CreateStreamParams, network: &NetworkDescriptor) -> Result<TokenClass, StreamError> {
        if p.start_time >= p.stop_time {
            return Err(StreamError::validation("Start time must be before stop time."));
        }
        let grace = self.connection.config().start_grace_secs;
        if p.start_time < self.clock.now().saturating_sub(grace) {
            return Err(StreamError::validation("Start time cannot be in the past."));
        }
        if p.recipient == Address::ZERO {
            return Err(StreamError::validation("Recipient cannot be the zero address."));
        }
        if p.deposit.is_zero() {
            return Err(StreamError::validation("Deposit must be greater than zero."));
        }
        classify_selection(p.token, network)
    }

    // ── Mutations ────────────────────────────────────────────────────────────

    /// Create a stream and return its id.
    ///
    /// Native-currency streams send the deposit as value in one transaction;
    /// ERC-20 streams approve the deposit first and create once the approval
    /// is confirmed. Creations on one gateway never interleave.
    pub async fn create_stream(&self, params: CreateStreamParams) -> Result<StreamId, StreamError> {
        let result = self.create_stream_inner(&params).await;
        self.report("create_stream", result, |id| {
            format!("Stream created successfully! ID: {id}")
        })
    }

    async fn create_stream_inner(&self, p: &CreateStreamParams) -> Result<StreamId, StreamError> {
        let ctx = self.context()?;
        let class = self.validate_create(p, ctx.network)?;

        // busy covers creations still queued behind another
        let _busy = self.connection.begin_operation();
        let _serial = self.create_lock.lock().await;
        let stream = ctx.stream();

        let call = IPaymentStream::createStreamCall {
            recipient: p.recipient,
            token: p.token.on_chain(),
            deposit: p.deposit,
            startTime: U256::from(p.start_time),
            stopTime: U256::from(p.stop_time),
        };

        let receipt = match class {
            TokenClass::Native => {
                self.notify(
                    &format!("Creating stream with native {}...", ctx.network.native_currency.symbol),
                    NotificationKind::Success,
                );
                stream.create_stream(call, Some(p.deposit)).await?
            }
            TokenClass::Erc20(token) => {
                self.notify("Please approve the token transfer...", NotificationKind::Success);
                ctx.erc20(token).approve(stream.address(), p.deposit).await?;
                self.notify("Approval successful! Now creating stream...", NotificationKind::Success);
                stream.create_stream(call, None).await?
            }
        };

        let event = receipt
            .stream_created(stream.address())
            .ok_or_else(|| StreamError::MissingEvent {
                tx_hash: receipt.transaction_hash.to_string(),
            })?;
        let id = StreamId::try_from(event.streamId).map_err(StreamError::Decode)?;
        tracing::info!(
            stream_id = %id,
            tx_hash = %receipt.transaction_hash,
            chain_id = ctx.network.chain_id,
            "stream created"
        );
        Ok(id)
    }

    /// Withdraw `amount` from a stream to its recipient.
    pub async fn withdraw(&self, id: StreamId, amount: U256) -> Result<(), StreamError> {
        let result = async {
            let ctx = self.context()?;
            if amount.is_zero() {
                return Err(StreamError::validation("Amount must be greater than zero."));
            }
            let _busy = self.connection.begin_operation();
            let _serial = self.stream_locks.acquire(id).await;
            let receipt = ctx.stream().withdraw(id, amount).await?;
            tracing::info!(stream_id = %id, tx_hash = %receipt.transaction_hash, "withdrawal confirmed");
            Ok(())
        }
        .await;
        self.report("withdraw", result, |_| "Withdrawal successful!".to_string())
    }

    /// Cancel a stream, settling both parties.
    pub async fn cancel(&self, id: StreamId) -> Result<(), StreamError> {
        let result = async {
            let ctx = self.context()?;
            let _busy = self.connection.begin_operation();
            let _serial = self.stream_locks.acquire(id).await;
            let receipt = ctx.stream().cancel_stream(id).await?;
            tracing::info!(stream_id = %id, tx_hash = %receipt.transaction_hash, "stream cancelled");
            Ok::<_, StreamError>(())
        }
        .await;
        self.report("cancel", result, |_| "Stream cancelled successfully!".to_string())
    }

    /// Add `amount` to a stream's deposit, paid the same way as at creation.
    pub async fn top_up(&self, id: StreamId, amount: U256) -> Result<(), StreamError> {
        let result = async {
            let ctx = self.context()?;
            if amount.is_zero() {
                return Err(StreamError::validation("Amount must be greater than zero."));
            }
            let _busy = self.connection.begin_operation();
            let _serial = self.stream_locks.acquire(id).await;
            let stream = ctx.stream();
            let raw = stream.get_stream(id).await?;
            let receipt = match classify_token(raw.token, ctx.network) {
                TokenClass::Native => stream.top_up_stream(id, amount, Some(amount)).await?,
                TokenClass::Erc20(token) => {
                    ctx.erc20(token).approve(stream.address(), amount).await?;
                    stream.top_up_stream(id, amount, None).await?
                }
            };
            tracing::info!(stream_id = %id, tx_hash = %receipt.transaction_hash, "top-up confirmed");
            Ok(())
        }
        .await;
        self.report("top_up", result, |_| "Stream topped up successfully!".to_string())
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    /// Full details of one stream, or `None` if it cannot be read.
    pub async fn get_stream_details(&self, id: StreamId) -> Option<StreamDetails> {
        match self.try_stream_details(id).await {
            Ok(details) => Some(details),
            Err(e) => {
                tracing::debug!(stream_id = %id, error = %e, "stream details unavailable");
                None
            }
        }
    }

    /// [`get_stream_details`](Self::get_stream_details) with the failure kept.
    pub async fn try_stream_details(&self, id: StreamId) -> Result<StreamDetails, StreamError> {
        let ctx = self.context()?;
        let _busy = self.connection.begin_operation();
        let stream = ctx.stream();
        let raw = stream.get_stream(id).await?;
        read_model::resolve(&stream, &ctx.eth, ctx.network, ctx.account, id, &raw, MetaFallback::Fail).await
    }

    /// Amount the recipient could withdraw right now; zero if unavailable.
    pub async fn get_withdrawable_amount(&self, id: StreamId) -> U256 {
        let result = async {
            let ctx = self.context()?;
            ctx.stream().withdrawable_amount(id).await
        }
        .await;
        result.unwrap_or_else(|e| {
            tracing::debug!(stream_id = %id, error = %e, "withdrawable amount unavailable");
            U256::ZERO
        })
    }

    /// All streams `address` sends or receives, newest id first.
    ///
    /// Each entry costs its own withdrawable and token reads.
    pub async fn get_user_streams(&self, address: Address) -> Result<Vec<UserStreamEntry>, StreamError> {
        let result = self.user_streams_inner(address).await;
        if let Err(e) = &result {
            tracing::warn!(%address, error = %e, "fetching user streams failed");
            if !e.is_precondition() {
                self.notify("Failed to fetch streams.", NotificationKind::Error);
            }
        }
        result
    }

    async fn user_streams_inner(&self, address: Address) -> Result<Vec<UserStreamEntry>, StreamError> {
        let ctx = self.context()?;
        let _busy = self.connection.begin_operation();
        let stream = ctx.stream();

        let (sent, received) = futures::try_join!(
            tolerate_empty(stream.sender_streams(address), NO_SENDER_STREAMS),
            tolerate_empty(stream.recipient_streams(address), NO_RECIPIENT_STREAMS),
        )?;

        let tagged = sent
            .into_iter()
            .map(|e| (Role::Sent, e))
            .chain(received.into_iter().map(|e| (Role::Received, e)));

        let mut entries = Vec::new();
        for (role, entry) in tagged {
            let id = StreamId::try_from(entry.streamId).map_err(StreamError::Decode)?;
            let details = read_model::resolve(
                &stream,
                &ctx.eth,
                ctx.network,
                ctx.account,
                id,
                &entry.stream,
                MetaFallback::Unknown,
            )
            .await?;
            entries.push(UserStreamEntry { role, stream: details });
        }
        entries.sort_by(|a, b| b.stream.id.cmp(&a.stream.id));
        tracing::debug!(%address, count = entries.len(), "user streams loaded");
        Ok(entries)
    }

    /// Balance of the connected account in `token`.
    pub async fn token_balance(&self, token: TokenAddress) -> Result<U256, StreamError> {
        let ctx = self.context()?;
        match token {
            TokenAddress::Native => ctx.eth.balance(ctx.account).await,
            TokenAddress::Contract(address) => ctx.erc20(address).balance_of(ctx.account).await,
        }
    }

    /// Symbol and decimals of `token`, read from the token contract when it is
    /// not the native currency. Tokens without metadata read as `Unknown`/18.
    pub async fn token_metadata(&self, token: TokenAddress) -> Result<TokenMeta, StreamError> {
        let ctx = self.context()?;
        match token {
            TokenAddress::Native => Ok(native_meta(ctx.network)),
            TokenAddress::Contract(address) => {
                read_model::token_meta(&ctx.eth, ctx.network, address, ctx.account, MetaFallback::Unknown).await
            }
        }
    }

    /// How much of `token` the stream contract may pull from the connected
    /// account. Unlimited for the native currency.
    pub async fn token_allowance(&self, token: TokenAddress) -> Result<U256, StreamError> {
        let ctx = self.context()?;
        match token {
            TokenAddress::Native => Ok(U256::MAX),
            TokenAddress::Contract(address) => {
                ctx.erc20(address)
                    .allowance(ctx.account, ctx.network.stream_contract)
                    .await
            }
        }
    }
}

/// Map the contract's "no streams for X" revert to an empty list.
async fn tolerate_empty<T>(
    read: impl std::future::Future<Output = Result<Vec<T>, StreamError>>,
    empty_reason: &str,
) -> Result<Vec<T>, StreamError> {
    match read.await {
        Err(e) if e.revert_reason().is_some_and(|r| r.contains(empty_reason)) => Ok(Vec::new()),
        other => other,
    }
}
