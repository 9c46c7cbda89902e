//! Read-model types: the normalized projection of on-chain stream state.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::token::TokenMeta;

// ─── StreamId ─────────────────────────────────────────────────────────────────

/// Numeric stream id, unique per contract deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(pub u64);

impl StreamId {
    pub fn as_u256(&self) -> U256 {
        U256::from(self.0)
    }
}

impl From<u64> for StreamId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl TryFrom<U256> for StreamId {
    type Error = String;

    fn try_from(v: U256) -> Result<Self, Self::Error> {
        u64::try_from(v)
            .map(Self)
            .map_err(|_| format!("stream id {v} does not fit in u64"))
    }
}

impl FromStr for StreamId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| format!("invalid stream id '{s}'"))
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Role / status ────────────────────────────────────────────────────────────

/// Which side of a stream an address is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Sent,
    Received,
}

/// Schedule phase of a stream at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    /// Before `start_time`.
    Pending,
    /// `start_time <= now < stop_time`.
    Active,
    /// At or after `stop_time`.
    Completed,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

// ─── StreamDetails ────────────────────────────────────────────────────────────

/// Normalized view of one stream. Always re-fetched after a mutation, never
/// patched locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDetails {
    pub id: StreamId,
    pub sender: Address,
    pub recipient: Address,
    /// Zero address for native-currency streams.
    pub token_address: Address,
    pub token_symbol: String,
    pub token_decimals: u8,
    pub total_amount: U256,
    pub withdrawn: U256,
    pub remaining_balance: U256,
    pub withdrawable_amount: U256,
    pub start_time: u64,
    pub stop_time: u64,
}

/// Raw amounts and schedule as read from the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamParts {
    pub id: StreamId,
    pub sender: Address,
    pub recipient: Address,
    pub token_address: Address,
    pub deposit: U256,
    pub withdrawn: U256,
    pub withdrawable: U256,
    pub start_time: u64,
    pub stop_time: u64,
}

impl StreamDetails {
    /// Assemble a projection, enforcing `withdrawn <= total` and
    /// `withdrawable <= remaining`.
    pub fn assemble(parts: StreamParts, token: TokenMeta) -> Self {
        let withdrawn = parts.withdrawn.min(parts.deposit);
        let remaining_balance = parts.deposit - withdrawn;
        Self {
            id: parts.id,
            sender: parts.sender,
            recipient: parts.recipient,
            token_address: parts.token_address,
            token_symbol: token.symbol,
            token_decimals: token.decimals,
            total_amount: parts.deposit,
            withdrawn,
            remaining_balance,
            withdrawable_amount: parts.withdrawable.min(remaining_balance),
            start_time: parts.start_time,
            stop_time: parts.stop_time,
        }
    }

    /// Elapsed fraction of the schedule at `now`, clamped to `[0, 1]`.
    pub fn progress(&self, now: u64) -> f64 {
        if now <= self.start_time {
            return 0.0;
        }
        if now >= self.stop_time {
            return 1.0;
        }
        let elapsed = (now - self.start_time) as f64;
        let duration = (self.stop_time - self.start_time) as f64;
        (elapsed / duration).clamp(0.0, 1.0)
    }

    pub fn status(&self, now: u64) -> StreamStatus {
        if now < self.start_time {
            StreamStatus::Pending
        } else if now < self.stop_time {
            StreamStatus::Active
        } else {
            StreamStatus::Completed
        }
    }

    /// Role of `address` in this stream, if it is a party.
    pub fn role_of(&self, address: Address) -> Option<Role> {
        if address == self.sender {
            Some(Role::Sent)
        } else if address == self.recipient {
            Some(Role::Received)
        } else {
            None
        }
    }

    /// Navigation path of the stream-detail view.
    pub fn detail_path(&self) -> String {
        format!("/stream/{}", self.id)
    }
}

/// A stream tagged with the queried address's role in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStreamEntry {
    pub role: Role,
    pub stream: StreamDetails,
}
