//! Funding input selection over a wallet's UTxO snapshot.
//!
//! Selection is a pure scan: the snapshot is never mutated and nothing is
//! reserved. Two callers may pick the same input; the loser finds out at
//! submission time.

use serde::{Deserialize, Serialize};

use record_tx_core::{flatten_assets, Address, AssetId, Assets, OutputReference};

use crate::error::SelectionError;

/// An unspent output as reported by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub out_ref: OutputReference,
    #[serde(with = "address_bech32")]
    pub address: Address,
    pub assets: Assets,
}

/// A condition a funding input must satisfy.
pub trait UtxoPredicate {
    fn matches(&self, utxo: &Utxo) -> bool;

    /// Human-readable description used in error messages.
    fn describe(&self) -> String;
}

/// Holds exactly one asset, lovelace, with at least the given quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LovelaceOnlyAtLeast(pub u64);

impl UtxoPredicate for LovelaceOnlyAtLeast {
    fn matches(&self, utxo: &Utxo) -> bool {
        // Units that fail to parse cannot be lovelace-only.
        match flatten_assets(&utxo.assets) {
            Ok(flat) => matches!(
                flat.as_slice(),
                [(AssetId::Lovelace, quantity)] if *quantity >= self.0
            ),
            Err(_) => false,
        }
    }

    fn describe(&self) -> String {
        format!(
            "an ADA-only UTxO with at least {} lovelace ({} ADA)",
            self.0,
            self.0 / 1_000_000
        )
    }
}

impl<F> UtxoPredicate for F
where
    F: Fn(&Utxo) -> bool,
{
    fn matches(&self, utxo: &Utxo) -> bool {
        self(utxo)
    }

    fn describe(&self) -> String {
        "a UTxO matching a custom predicate".to_string()
    }
}

/// Return the first UTxO, in the caller's order, satisfying `predicate`.
pub fn select_first<'a, P>(
    utxos: &'a [Utxo],
    predicate: &P,
) -> Result<&'a Utxo, SelectionError>
where
    P: UtxoPredicate + ?Sized,
{
    match utxos.iter().position(|u| predicate.matches(u)) {
        Some(idx) => {
            let utxo = &utxos[idx];
            tracing::debug!(out_ref = %utxo.out_ref, scanned = idx + 1, "selected funding input");
            Ok(utxo)
        }
        None => Err(SelectionError::NoMatch {
            wanted: predicate.describe(),
            scanned: utxos.len(),
        }),
    }
}

mod address_bech32 {
    use record_tx_core::Address;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        let text = address.to_bech32().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use record_tx_core::{Credential, KeyHash, Network, TxHash};

    const ADA: u64 = 1_000_000;

    fn utxo(index: u64, assets: Assets) -> Utxo {
        Utxo {
            out_ref: OutputReference::new(TxHash::from_bytes([0x01; 32]), index),
            address: Address::enterprise(
                Network::Testnet,
                Credential::PublicKey(KeyHash::from_bytes([0x11; 28])),
            ),
            assets,
        }
    }

    fn snapshot() -> Vec<Utxo> {
        let token = format!("{}{}", "9e".repeat(28), "01");
        vec![
            utxo(0, Assets::lovelace(100 * ADA).with(token, 1)),
            utxo(1, Assets::lovelace(40 * ADA)),
            utxo(2, Assets::lovelace(60 * ADA)),
        ]
    }

    #[test]
    fn test_selects_first_matching() {
        let utxos = snapshot();
        let selected = select_first(&utxos, &LovelaceOnlyAtLeast(50 * ADA)).unwrap();
        assert_eq!(selected.out_ref.index, 2);
    }

    #[test]
    fn test_no_match_carries_description() {
        let utxos = snapshot();
        let err = select_first(&utxos[..2], &LovelaceOnlyAtLeast(50 * ADA)).unwrap_err();
        match err {
            SelectionError::NoMatch { wanted, scanned } => {
                assert!(wanted.contains("50 ADA"));
                assert_eq!(scanned, 2);
            }
        }
    }

    #[test]
    fn test_exact_threshold_matches() {
        let utxos = vec![utxo(0, Assets::lovelace(50 * ADA))];
        assert!(select_first(&utxos, &LovelaceOnlyAtLeast(50 * ADA)).is_ok());
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(select_first(&[], &LovelaceOnlyAtLeast(1)).is_err());
    }

    #[test]
    fn test_closure_predicate() {
        let utxos = snapshot();
        let selected = select_first(&utxos, &|u: &Utxo| u.assets.len() == 2).unwrap();
        assert_eq!(selected.out_ref.index, 0);
    }

    #[test]
    fn test_utxo_json_roundtrip() {
        let original = utxo(7, Assets::lovelace(ADA));
        let json = serde_json::to_string(&original).unwrap();
        let back: Utxo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }

    proptest! {
        #[test]
        fn prop_selects_earliest_match(
            entries in proptest::collection::vec((0u64..200, any::<bool>()), 0..12),
            threshold in 0u64..200,
        ) {
            let token = format!("{}{}", "9e".repeat(28), "01");
            let utxos: Vec<Utxo> = entries
                .iter()
                .enumerate()
                .map(|(i, (ada, with_token))| {
                    let assets = Assets::lovelace(ada * ADA);
                    let assets = if *with_token { assets.with(token.as_str(), 1) } else { assets };
                    utxo(i as u64, assets)
                })
                .collect();
            let expected = entries
                .iter()
                .position(|(ada, with_token)| !with_token && *ada >= threshold);

            let predicate = LovelaceOnlyAtLeast(threshold * ADA);
            match (select_first(&utxos, &predicate), expected) {
                (Ok(selected), Some(idx)) => prop_assert_eq!(selected.out_ref.index, idx as u64),
                (Err(SelectionError::NoMatch { scanned, .. }), None) => {
                    prop_assert_eq!(scanned, utxos.len())
                }
                (got, want) => prop_assert!(false, "got {:?}, expected index {:?}", got, want),
            }
        }
    }
}
