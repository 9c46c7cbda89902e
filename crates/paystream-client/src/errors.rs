//! Mapping of wallet/node failures onto [`StreamError`].

use paystream_core::StreamError;
use paystream_evm::{decode_revert_hex, reason_from_message, RevertReason};
use paystream_rpc::{codes, TransportError};

/// Classify a transport failure into the client failure taxonomy.
///
/// - wallet code 4001 → `UserRejected`
/// - revert data or an "execution reverted" message → `ChainRevert`, with
///   the decoded `Error(string)` reason when there is one
/// - undecodable responses → `Decode`
/// - everything else → `Transport`
pub fn classify(err: TransportError) -> StreamError {
    if err.is_user_rejection() {
        let message = match &err {
            TransportError::Rpc(e) => e.message.clone(),
            other => other.to_string(),
        };
        return StreamError::UserRejected(message);
    }

    if let Some(reason) = err.revert_data().and_then(decode_revert_hex) {
        let reason = match reason {
            RevertReason::Empty => None,
            other => Some(other.to_string()),
        };
        return StreamError::ChainRevert { reason };
    }

    match err {
        TransportError::Rpc(e)
            if e.code == codes::EXECUTION_REVERTED || e.message.contains("execution reverted") =>
        {
            StreamError::ChainRevert {
                reason: reason_from_message(&e.message).map(str::to_string),
            }
        }
        TransportError::Deserialization(e) => StreamError::Decode(e.to_string()),
        other => StreamError::Transport(other.to_string()),
    }
}
