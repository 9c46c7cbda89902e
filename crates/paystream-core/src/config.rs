//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::network::NetworkName;

/// Configuration for a connection manager / gateway pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Network selected before the user picks one.
    #[serde(default)]
    pub default_network: NetworkName,
    /// How far in the past a new stream's start time may lie (seconds).
    #[serde(default = "default_start_grace_secs")]
    pub start_grace_secs: u64,
    /// Receipt polling interval while awaiting confirmation (milliseconds).
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
}

fn default_start_grace_secs() -> u64 { 60 }
fn default_receipt_poll_interval_ms() -> u64 { 1_000 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_network: NetworkName::default(),
            start_grace_secs: default_start_grace_secs(),
            receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
        }
    }
}

impl ClientConfig {
    /// Config starting on the given network.
    pub fn for_network(network: NetworkName) -> Self {
        Self {
            default_network: network,
            ..Self::default()
        }
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}
