//! Configuration for the record flows.

use serde::{Deserialize, Serialize};

use record_tx_core::{Lovelace, Network, ValueOrder};

/// Configuration for [`RecordTx`](crate::RecordTx).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreConfig {
    /// Network of the derived script addresses.
    pub network: Network,
    /// Minimum lovelace of the ADA-only input that funds a new record.
    pub funding_threshold: Lovelace,
    /// Blueprint title of the record minting validator.
    pub record_validator: String,
    /// Label byte: the head token's name, and the prefix of account token names.
    pub record_label: u8,
    /// Lovelace locked with each token output.
    pub min_output_lovelace: Lovelace,
    /// Ordering of multi-asset values in built outputs.
    pub value_order: ValueOrder,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            funding_threshold: 50_000_000,
            record_validator: "record.mint".to_string(),
            record_label: 0x9e,
            min_output_lovelace: 2_000_000,
            value_order: ValueOrder::Insertion,
        }
    }
}

impl CoreConfig {
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn with_value_order(mut self, order: ValueOrder) -> Self {
        self.value_order = order;
        self
    }
}
