//! In-memory wallet that simulates the stream contract and ERC-20 tokens.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{address, Address, Bytes, B256, U256, U64};
use alloy_sol_types::{Revert, SolError, SolEvent, SolInterface, SolValue};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use paystream_client::{ConnectionManager, ContractGateway};
use paystream_core::{ClientConfig, FixedClock, NetworkName, RecordingNotifier};
use paystream_evm::bindings::IERC20::IERC20Calls;
use paystream_evm::bindings::IPaymentStream::{IPaymentStreamCalls, StreamCreated};
use paystream_evm::{Log, Stream, StreamEntry, TransactionReceipt};
use paystream_rpc::{codes, JsonRpcError, TransportError, WalletEvent, WalletProvider};

pub const NOW: u64 = 1_700_000_000;

pub const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
pub const BOB: Address = address!("0000000000000000000000000000000000000b0b");
pub const CAROL: Address = address!("00000000000000000000000000000000000ca401");
/// cUSD on Celo Sepolia.
pub const CUSD: Address = address!("EF4d55D6dE8e8d73232827Cd1e9b2F2dBb45bC80");
/// USDC on Celo Sepolia.
pub const USDC: Address = address!("01C5C0122039549AD1493B8220cABEdD739BC44E");

#[derive(Default)]
pub struct MockState {
    pub chain_id: u64,
    pub accounts: Vec<Address>,
    pub known_chains: HashSet<u64>,
    pub contract: Address,
    pub streams: BTreeMap<u64, Stream>,
    pub next_stream_id: u64,
    pub withdrawable: HashMap<u64, U256>,
    /// token → (symbol, decimals)
    pub tokens: HashMap<Address, (String, u8)>,
    /// (token, owner, spender) → allowance
    pub allowances: HashMap<(Address, Address, Address), U256>,
    /// account → native balance
    pub native_balances: HashMap<Address, U256>,
    /// (token, owner) → ERC-20 balance
    pub token_balances: HashMap<(Address, Address), U256>,
    /// Receipts by tx hash, served after `receipt_delay_polls` null answers.
    pub receipts: HashMap<B256, (TransactionReceipt, u32)>,
    pub receipt_delay_polls: u32,
    pub tx_counter: u64,
    /// Methods (or `call:`/`tx:` function names) the user rejects.
    pub reject: HashSet<String>,
    /// Function names whose eth_call reverts with the given reason.
    pub call_reverts: HashMap<String, String>,
    pub suppress_created_event: bool,
    /// Artificial latency of every `eth_sendTransaction`.
    pub tx_latency: Duration,
    pub in_flight_tx: HashMap<u64, usize>,
    pub max_in_flight_same_stream: usize,
    pub max_in_flight_total: usize,
    pub log: Vec<String>,
}

pub struct MockWallet {
    pub state: Mutex<MockState>,
    events: broadcast::Sender<WalletEvent>,
}

fn hex_bytes(data: Vec<u8>) -> Value {
    json!(Bytes::from(data))
}

fn revert(reason: &str) -> TransportError {
    let data = Revert {
        reason: reason.to_string(),
    }
    .abi_encode();
    TransportError::Rpc(JsonRpcError {
        code: codes::EXECUTION_REVERTED,
        message: format!("execution reverted: {reason}"),
        data: Some(hex_bytes(data)),
    })
}

fn user_rejected() -> TransportError {
    TransportError::provider(codes::USER_REJECTED, "User rejected the request.")
}

fn param<T: serde::de::DeserializeOwned>(tx: &Value, key: &str) -> Option<T> {
    tx.get(key).cloned().and_then(|v| serde_json::from_value(v).ok())
}

impl MockWallet {
    pub fn new(network: NetworkName) -> Arc<Self> {
        let desc = network.descriptor();
        let mut state = MockState {
            chain_id: desc.chain_id,
            accounts: vec![ALICE],
            contract: desc.stream_contract,
            next_stream_id: 1,
            ..MockState::default()
        };
        for n in NetworkName::ALL {
            if n != NetworkName::ArcTestnet {
                state.known_chains.insert(n.descriptor().chain_id);
            }
        }
        state.tokens.insert(CUSD, ("cUSD".into(), 18));
        state.tokens.insert(USDC, ("USDC".into(), 6));
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            state: Mutex::new(state),
            events,
        })
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn log(&self) -> Vec<String> {
        self.with(|s| s.log.clone())
    }

    pub fn clear_log(&self) {
        self.with(|s| s.log.clear());
    }

    /// Entries of the log starting with `prefix`.
    pub fn logged(&self, prefix: &str) -> Vec<String> {
        self.log().into_iter().filter(|l| l.starts_with(prefix)).collect()
    }

    pub fn emit(&self, event: WalletEvent) {
        let _ = self.events.send(event);
    }

    /// Put a stream straight into contract storage.
    pub fn seed_stream(&self, id: u64, stream: Stream) {
        self.with(|s| {
            s.streams.insert(id, stream);
            s.next_stream_id = s.next_stream_id.max(id + 1);
        });
    }

    fn record(&self, entry: impl Into<String>) {
        self.with(|s| s.log.push(entry.into()));
    }

    fn handle_call(&self, tx: &Value) -> Result<Value, TransportError> {
        let to: Address = param(tx, "to").ok_or_else(|| TransportError::Other("missing to".into()))?;
        let data: Bytes = param(tx, "data").unwrap_or_default();

        let mut s = self.state.lock().unwrap();
        if to == s.contract {
            let call = IPaymentStreamCalls::abi_decode(&data)
                .map_err(|e| TransportError::Other(e.to_string()))?;
            let name = match &call {
                IPaymentStreamCalls::getStream(_) => "getStream",
                IPaymentStreamCalls::withdrawableAmount(_) => "withdrawableAmount",
                IPaymentStreamCalls::getSenderStreams(_) => "getSenderStreams",
                IPaymentStreamCalls::getRecipientStreams(_) => "getRecipientStreams",
                _ => "other",
            };
            s.log.push(format!("call:{name}"));
            if let Some(reason) = s.call_reverts.get(name) {
                return Err(revert(reason));
            }
            let out = match call {
                IPaymentStreamCalls::getStream(c) => {
                    let id = c.streamId.to::<u64>();
                    let stream = s.streams.get(&id).ok_or_else(|| revert("stream does not exist"))?;
                    stream.abi_encode()
                }
                IPaymentStreamCalls::withdrawableAmount(c) => {
                    let id = c.streamId.to::<u64>();
                    let stream = s.streams.get(&id).ok_or_else(|| revert("stream does not exist"))?;
                    let amount = s
                        .withdrawable
                        .get(&id)
                        .copied()
                        .unwrap_or(stream.deposit - stream.withdrawn);
                    amount.abi_encode()
                }
                IPaymentStreamCalls::getSenderStreams(c) => {
                    let entries = entries_where(&s.streams, |st| st.sender == c.sender);
                    if entries.is_empty() {
                        return Err(revert("no streams for sender"));
                    }
                    entries.abi_encode()
                }
                IPaymentStreamCalls::getRecipientStreams(c) => {
                    let entries = entries_where(&s.streams, |st| st.recipient == c.recipient);
                    if entries.is_empty() {
                        return Err(revert("no streams for recipient"));
                    }
                    entries.abi_encode()
                }
                _ => return Err(TransportError::Other("not a view function".into())),
            };
            return Ok(hex_bytes(out));
        }

        let call = IERC20Calls::abi_decode(&data).map_err(|e| TransportError::Other(e.to_string()))?;
        let Some((symbol, decimals)) = s.tokens.get(&to).cloned() else {
            s.log.push("call:erc20".into());
            return Err(revert("not a token"));
        };
        let out = match call {
            IERC20Calls::symbol(_) => {
                s.log.push("call:symbol".into());
                symbol.abi_encode()
            }
            IERC20Calls::decimals(_) => {
                s.log.push("call:decimals".into());
                <alloy_sol_types::sol_data::Uint<8> as alloy_sol_types::SolType>::abi_encode(&decimals)
            }
            IERC20Calls::balanceOf(c) => {
                s.log.push("call:balanceOf".into());
                s.token_balances
                    .get(&(to, c.account))
                    .copied()
                    .unwrap_or_default()
                    .abi_encode()
            }
            IERC20Calls::allowance(c) => {
                s.log.push("call:allowance".into());
                s.allowances
                    .get(&(to, c.owner, c.spender))
                    .copied()
                    .unwrap_or_default()
                    .abi_encode()
            }
            _ => return Err(TransportError::Other("not a view function".into())),
        };
        Ok(hex_bytes(out))
    }

    async fn handle_send(&self, tx: &Value) -> Result<Value, TransportError> {
        let from: Address = param(tx, "from").unwrap_or_default();
        let to: Address = param(tx, "to").ok_or_else(|| TransportError::Other("missing to".into()))?;
        let data: Bytes = param(tx, "data").unwrap_or_default();
        let value: U256 = param(tx, "value").unwrap_or_default();

        let (name, stream_id, latency) = {
            let s = self.state.lock().unwrap();
            let (name, id) = if to == s.contract {
                match IPaymentStreamCalls::abi_decode(&data) {
                    Ok(IPaymentStreamCalls::createStream(_)) => ("createStream", None),
                    Ok(IPaymentStreamCalls::withdraw(c)) => ("withdraw", Some(c.streamId.to::<u64>())),
                    Ok(IPaymentStreamCalls::cancelStream(c)) => ("cancelStream", Some(c.streamId.to::<u64>())),
                    Ok(IPaymentStreamCalls::topUpStream(c)) => ("topUpStream", Some(c.streamId.to::<u64>())),
                    _ => ("unknown", None),
                }
            } else {
                match IERC20Calls::abi_decode(&data) {
                    Ok(IERC20Calls::approve(_)) => ("approve", None),
                    _ => ("unknown", None),
                }
            };
            if s.reject.contains(&format!("tx:{name}")) || s.reject.contains("eth_sendTransaction") {
                drop(s);
                self.record(format!("tx:{name}"));
                return Err(user_rejected());
            }
            (name, id, s.tx_latency)
        };
        self.record(format!("tx:{name}"));

        if let Some(id) = stream_id {
            self.with(|s| {
                let n = s.in_flight_tx.entry(id).or_default();
                *n += 1;
                let same = *n;
                let total: usize = s.in_flight_tx.values().sum();
                s.max_in_flight_same_stream = s.max_in_flight_same_stream.max(same);
                s.max_in_flight_total = s.max_in_flight_total.max(total);
            });
        }
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut s = self.state.lock().unwrap();
        if let Some(id) = stream_id {
            if let Some(n) = s.in_flight_tx.get_mut(&id) {
                *n -= 1;
            }
        }
        let contract = s.contract;
        let mut logs = Vec::new();
        let ok = if to == contract {
            match IPaymentStreamCalls::abi_decode(&data) {
                Ok(IPaymentStreamCalls::createStream(c)) => {
                    let funded = if c.token == Address::ZERO {
                        value == c.deposit
                    } else {
                        take_allowance(&mut s, c.token, from, contract, c.deposit)
                    };
                    if funded && c.startTime < c.stopTime {
                        let id = s.next_stream_id;
                        s.next_stream_id += 1;
                        s.streams.insert(
                            id,
                            Stream {
                                sender: from,
                                recipient: c.recipient,
                                token: c.token,
                                deposit: c.deposit,
                                withdrawn: U256::ZERO,
                                startTime: c.startTime,
                                stopTime: c.stopTime,
                            },
                        );
                        if !s.suppress_created_event {
                            let event = StreamCreated {
                                streamId: U256::from(id),
                                sender: from,
                                recipient: c.recipient,
                                token: c.token,
                                deposit: c.deposit,
                                startTime: c.startTime,
                                stopTime: c.stopTime,
                            };
                            let log = event.encode_log_data();
                            logs.push(Log {
                                address: contract,
                                topics: log.topics().to_vec(),
                                data: log.data.clone(),
                            });
                        }
                        true
                    } else {
                        false
                    }
                }
                Ok(IPaymentStreamCalls::withdraw(c)) => {
                    let id = c.streamId.to::<u64>();
                    match s.streams.get_mut(&id) {
                        Some(st) if st.withdrawn + c.amount <= st.deposit => {
                            st.withdrawn += c.amount;
                            true
                        }
                        _ => false,
                    }
                }
                Ok(IPaymentStreamCalls::cancelStream(c)) => {
                    s.streams.remove(&c.streamId.to::<u64>()).is_some()
                }
                Ok(IPaymentStreamCalls::topUpStream(c)) => {
                    let id = c.streamId.to::<u64>();
                    let token = s.streams.get(&id).map(|st| st.token);
                    let funded = match token {
                        Some(t) if t == Address::ZERO => value == c.amount,
                        Some(t) => take_allowance(&mut s, t, from, contract, c.amount),
                        None => false,
                    };
                    if funded {
                        if let Some(st) = s.streams.get_mut(&id) {
                            st.deposit += c.amount;
                        }
                    }
                    funded
                }
                _ => false,
            }
        } else {
            match IERC20Calls::abi_decode(&data) {
                Ok(IERC20Calls::approve(c)) => {
                    s.allowances.insert((to, from, c.spender), c.amount);
                    true
                }
                _ => false,
            }
        };

        s.tx_counter += 1;
        let hash = B256::from(U256::from(s.tx_counter));
        let receipt = TransactionReceipt {
            transaction_hash: hash,
            block_number: Some(U64::from(s.tx_counter)),
            status: Some(U64::from(ok as u64)),
            logs,
        };
        let delay = s.receipt_delay_polls;
        s.receipts.insert(hash, (receipt, delay));
        Ok(json!(hash))
    }

    fn handle_receipt(&self, hash: B256) -> Value {
        let mut s = self.state.lock().unwrap();
        match s.receipts.get_mut(&hash) {
            Some((_, delay)) if *delay > 0 => {
                *delay -= 1;
                Value::Null
            }
            Some((receipt, _)) => json!(receipt),
            None => Value::Null,
        }
    }
}

fn entries_where(streams: &BTreeMap<u64, Stream>, pred: impl Fn(&Stream) -> bool) -> Vec<StreamEntry> {
    streams
        .iter()
        .filter(|(_, st)| pred(st))
        .map(|(id, st)| StreamEntry {
            streamId: U256::from(*id),
            stream: st.clone(),
        })
        .collect()
}

fn take_allowance(s: &mut MockState, token: Address, owner: Address, spender: Address, amount: U256) -> bool {
    let slot = s.allowances.entry((token, owner, spender)).or_default();
    if *slot < amount {
        return false;
    }
    *slot -= amount;
    true
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        let rejected = self.with(|s| s.reject.contains(method));
        match method {
            "eth_call" | "eth_sendTransaction" | "eth_getTransactionReceipt" => {}
            _ => self.record(method),
        }
        if rejected && method != "eth_sendTransaction" {
            return Err(user_rejected());
        }

        match method {
            "eth_requestAccounts" | "eth_accounts" => Ok(self.with(|s| json!(s.accounts))),
            "eth_chainId" => Ok(self.with(|s| json!(format!("0x{:x}", s.chain_id)))),
            "wallet_switchEthereumChain" => {
                let target = params
                    .first()
                    .and_then(|p| p.get("chainId"))
                    .and_then(|c| c.as_str())
                    .and_then(|c| u64::from_str_radix(c.trim_start_matches("0x"), 16).ok())
                    .ok_or_else(|| TransportError::Other("bad chainId".into()))?;
                self.with(|s| {
                    if s.known_chains.contains(&target) {
                        s.chain_id = target;
                        Ok(Value::Null)
                    } else {
                        Err(TransportError::provider(codes::UNRECOGNIZED_CHAIN, "Unrecognized chain ID"))
                    }
                })
            }
            "wallet_addEthereumChain" => {
                let target = params
                    .first()
                    .and_then(|p| p.get("chainId"))
                    .and_then(|c| c.as_str())
                    .and_then(|c| u64::from_str_radix(c.trim_start_matches("0x"), 16).ok())
                    .ok_or_else(|| TransportError::Other("bad chainId".into()))?;
                self.with(|s| s.known_chains.insert(target));
                Ok(Value::Null)
            }
            "eth_getBalance" => {
                let who: Address = params
                    .first()
                    .cloned()
                    .and_then(|v| serde_json::from_value(v).ok())
                    .unwrap_or_default();
                Ok(self.with(|s| json!(s.native_balances.get(&who).copied().unwrap_or_default())))
            }
            "eth_call" => self.handle_call(params.first().unwrap_or(&Value::Null)),
            "eth_sendTransaction" => self.handle_send(params.first().unwrap_or(&Value::Null)).await,
            "eth_getTransactionReceipt" => {
                let hash: B256 = params
                    .first()
                    .cloned()
                    .and_then(|v| serde_json::from_value(v).ok())
                    .unwrap_or_default();
                Ok(self.handle_receipt(hash))
            }
            other => Err(TransportError::provider(
                codes::UNSUPPORTED_METHOD,
                format!("{other} not supported"),
            )),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ─── Harness ──────────────────────────────────────────────────────────────────

pub struct Harness {
    pub wallet: Arc<MockWallet>,
    pub manager: Arc<ConnectionManager>,
    pub gateway: ContractGateway,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<FixedClock>,
}

pub fn harness(network: NetworkName) -> Harness {
    let wallet = MockWallet::new(network);
    let notifier = Arc::new(RecordingNotifier::new());
    let clock = Arc::new(FixedClock::new(NOW));
    let mut config = ClientConfig::for_network(network);
    config.receipt_poll_interval_ms = 1;
    let provider: Arc<dyn WalletProvider> = wallet.clone();
    let manager = Arc::new(ConnectionManager::new(Some(provider), notifier.clone(), config));
    let gateway = ContractGateway::new(manager.clone(), clock.clone());
    Harness {
        wallet,
        manager,
        gateway,
        notifier,
        clock,
    }
}

/// A harness with a connected session.
pub async fn connected(network: NetworkName) -> Harness {
    let h = harness(network);
    h.manager.connect().await.unwrap();
    h.wallet.clear_log();
    h.notifier.clear();
    h
}

pub fn stream(sender: Address, recipient: Address, token: Address, deposit: u64, withdrawn: u64) -> Stream {
    Stream {
        sender,
        recipient,
        token,
        deposit: U256::from(deposit),
        withdrawn: U256::from(withdrawn),
        startTime: U256::from(NOW),
        stopTime: U256::from(NOW + 1_000),
    }
}
