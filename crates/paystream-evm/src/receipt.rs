//! Transaction receipts as returned by `eth_getTransactionReceipt`, and
//! extraction of the stream-creation event from them.

use alloy_primitives::{Address, Bytes, B256, U64};
use alloy_sol_types::SolEvent;
use serde::{Deserialize, Serialize};

use crate::bindings::IPaymentStream::StreamCreated;

/// A log entry inside a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// The subset of a transaction receipt the client interprets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// `0x1` success, `0x0` reverted. Absent on pre-Byzantium receipts.
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    /// Returns `true` unless the receipt explicitly reports a revert.
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |s| s != U64::ZERO)
    }

    /// Find the `StreamCreated` event emitted by `contract` in this receipt.
    ///
    /// Logs from other addresses and logs that fail to decode are skipped.
    pub fn stream_created(&self, contract: Address) -> Option<StreamCreated> {
        self.logs
            .iter()
            .filter(|log| log.address == contract)
            .filter(|log| log.topics.first() == Some(&StreamCreated::SIGNATURE_HASH))
            .find_map(|log| {
                match StreamCreated::decode_raw_log(log.topics.iter().copied(), &log.data) {
                    Ok(event) => Some(event),
                    Err(e) => {
                        tracing::debug!(error = %e, "skipping undecodable StreamCreated log");
                        None
                    }
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, U256};
    use serde_json::json;

    const CONTRACT: Address = address!("7Fb08DbfC487c33459cdE8cc5F2dda71Ceb7e4E4");

    fn created_log(contract: Address, id: u64) -> Log {
        let event = StreamCreated {
            streamId: U256::from(id),
            sender: address!("00000000000000000000000000000000000000a1"),
            recipient: address!("00000000000000000000000000000000000000b2"),
            token: Address::ZERO,
            deposit: U256::from(10u64),
            startTime: U256::from(100u64),
            stopTime: U256::from(200u64),
        };
        let data = event.encode_log_data();
        Log {
            address: contract,
            topics: data.topics().to_vec(),
            data: data.data.clone(),
        }
    }

    fn receipt(logs: Vec<Log>) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: B256::repeat_byte(0x11),
            block_number: Some(U64::from(5)),
            status: Some(U64::from(1)),
            logs,
        }
    }

    #[test]
    fn finds_event_from_stream_contract() {
        let r = receipt(vec![
            Log {
                address: address!("00000000000000000000000000000000000000ee"),
                topics: vec![B256::repeat_byte(0xaa)],
                data: Bytes::new(),
            },
            created_log(CONTRACT, 9),
        ]);
        let event = r.stream_created(CONTRACT).unwrap();
        assert_eq!(event.streamId, U256::from(9u64));
    }

    #[test]
    fn ignores_event_from_other_contract() {
        let other = address!("00000000000000000000000000000000000000ff");
        let r = receipt(vec![created_log(other, 9)]);
        assert!(r.stream_created(CONTRACT).is_none());
    }

    #[test]
    fn parses_node_json() {
        let r: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "22".repeat(32)),
            "blockNumber": "0x10",
            "status": "0x0",
            "logs": [],
            "gasUsed": "0x5208"
        }))
        .unwrap();
        assert!(!r.succeeded());
        assert_eq!(r.block_number, Some(U64::from(16)));
    }

    #[test]
    fn missing_status_counts_as_success() {
        let mut r = receipt(vec![]);
        r.status = None;
        assert!(r.succeeded());
    }
}
