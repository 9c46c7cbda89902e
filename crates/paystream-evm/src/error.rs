//! ABI-layer error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AbiError {
    /// Return data or log payload did not match the expected ABI.
    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },
}

impl AbiError {
    pub fn decode(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            what,
            reason: err.to_string(),
        }
    }
}
