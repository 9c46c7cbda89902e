//! Revert-reason decoding for failed calls and transactions.
//!
//! Handles the two standard Solidity encodings:
//! - `Error(string)` : `0x08c379a0` ++ ABI-encode(string), from `require`
//! - `Panic(uint256)`: `0x4e487b71` ++ ABI-encode(uint256), from `assert`
//!   and checked arithmetic
//!
//! Anything else is reported by selector only.

use std::fmt;

use alloy_dyn_abi::{DynSolType, DynSolValue};

/// The 4-byte selector for `Error(string)`.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// The 4-byte selector for `Panic(uint256)`.
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Prefix nodes put in front of the reason in the error message.
const REVERTED_PREFIX: &str = "execution reverted";

/// A decoded revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// `require(cond, "message")`.
    Message(String),
    /// `Panic(code)`.
    Panic { code: u64, meaning: &'static str },
    /// A custom error or unknown payload, identified by its selector.
    Custom { selector: [u8; 4] },
    /// Bare `revert()` with no data.
    Empty,
}

impl RevertReason {
    /// The `require` message, if this revert carried one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(m) => write!(f, "{m}"),
            Self::Panic { code, meaning } => write!(f, "panic 0x{code:02x}: {meaning}"),
            Self::Custom { selector } => write!(f, "custom error 0x{}", hex::encode(selector)),
            Self::Empty => write!(f, "transaction reverted"),
        }
    }
}

/// Decode raw revert data.
pub fn decode_revert(data: &[u8]) -> RevertReason {
    if data.len() < 4 {
        return RevertReason::Empty;
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&data[..4]);
    let payload = &data[4..];

    match selector {
        ERROR_STRING_SELECTOR => match DynSolType::String.abi_decode(payload) {
            Ok(DynSolValue::String(s)) => RevertReason::Message(s),
            _ => RevertReason::Custom { selector },
        },
        PANIC_SELECTOR => match DynSolType::Uint(256).abi_decode(payload) {
            Ok(DynSolValue::Uint(v, _)) => {
                let code = u64::try_from(v).unwrap_or(u64::MAX);
                RevertReason::Panic {
                    code,
                    meaning: panic_meaning(code),
                }
            }
            _ => RevertReason::Custom { selector },
        },
        _ => RevertReason::Custom { selector },
    }
}

/// Decode revert data from a `0x`-prefixed hex string.
pub fn decode_revert_hex(hex_str: &str) -> Option<RevertReason> {
    let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    let bytes = hex::decode(stripped).ok()?;
    Some(decode_revert(&bytes))
}

/// Extract the reason from a node error message such as
/// `"execution reverted: no streams for sender"`.
pub fn reason_from_message(message: &str) -> Option<&str> {
    let idx = message.find(REVERTED_PREFIX)?;
    let rest = message[idx + REVERTED_PREFIX.len()..]
        .trim_start_matches(':')
        .trim();
    (!rest.is_empty()).then_some(rest)
}

/// Map a Solidity panic code to a human-readable description.
pub fn panic_meaning(code: u64) -> &'static str {
    match code {
        0x00 => "generic compiler-inserted panic",
        0x01 => "assert() called with false condition",
        0x11 => "arithmetic overflow or underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum value",
        0x22 => "corrupted storage byte array",
        0x31 => ".pop() on empty array",
        0x32 => "out-of-bounds array access",
        0x41 => "too much memory allocated",
        0x51 => "called zero-initialized internal function pointer",
        _ => "unknown panic code",
    }
}
