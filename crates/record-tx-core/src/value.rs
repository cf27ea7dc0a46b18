//! Ledger `Value`: a coin amount plus a two-level multi-asset tree.
//!
//! Invariants held by every `Value` built through this module:
//! - every token quantity is strictly positive
//! - no policy maps to an empty token map
//! - policies and tokens are unique

use serde::{Deserialize, Serialize};

use crate::assets::{flatten_assets, AssetId, Assets, FlatAsset};
use crate::canonical::{encode_array_header, encode_bytes, encode_map_header, encode_uint, major};
use crate::error::{CoreError, Result};
use crate::plutus_data::{expect_bytes, expect_int, FromPlutusData, PlutusData, ToPlutusData};
use crate::types::{AssetName, Lovelace, PolicyId};

/// Ordering applied to policies and tokens when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueOrder {
    /// First-occurrence order of the input.
    #[default]
    Insertion,
    /// Lexicographic by raw policy bytes, then raw token bytes.
    Canonical,
}

/// Policy id to (asset name to quantity), in entry order.
pub type MultiAsset = Vec<(PolicyId, Vec<(AssetName, u64)>)>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value {
    coin: Lovelace,
    multi_asset: MultiAsset,
}

impl Value {
    /// A value holding only the base unit.
    pub fn lovelace(coin: Lovelace) -> Self {
        Self {
            coin,
            multi_asset: Vec::new(),
        }
    }

    /// Group flattened entries into a value.
    ///
    /// The base unit may appear at most once. Zero-quantity native entries
    /// are dropped. Repeated (policy, token) pairs are summed.
    pub fn from_flat(flat: &[FlatAsset]) -> Result<Self> {
        let mut coin: Option<Lovelace> = None;
        let mut multi_asset: MultiAsset = Vec::new();

        for (asset, quantity) in flat {
            match asset {
                AssetId::Lovelace => {
                    if coin.is_some() {
                        return Err(CoreError::MultipleBaseUnitEntries);
                    }
                    coin = Some(*quantity);
                }
                AssetId::Native { policy, name } => {
                    if *quantity == 0 {
                        tracing::warn!(%policy, name = %name.to_hex(), "dropping zero-quantity asset");
                        continue;
                    }
                    let idx = match multi_asset.iter().position(|(p, _)| p == policy) {
                        Some(idx) => idx,
                        None => {
                            multi_asset.push((*policy, Vec::new()));
                            multi_asset.len() - 1
                        }
                    };
                    let tokens = &mut multi_asset[idx].1;
                    match tokens.iter_mut().find(|(n, _)| n == name) {
                        Some((_, existing)) => {
                            *existing = existing
                                .checked_add(*quantity)
                                .ok_or_else(|| CoreError::QuantityOverflow(asset.to_unit()))?;
                        }
                        None => tokens.push((name.clone(), *quantity)),
                    }
                }
            }
        }

        Ok(Self {
            coin: coin.unwrap_or(0),
            multi_asset,
        })
    }

    /// Flatten and group a unit mapping.
    pub fn from_assets(assets: &Assets) -> Result<Self> {
        Self::from_flat(&flatten_assets(assets)?)
    }

    pub fn coin(&self) -> Lovelace {
        self.coin
    }

    pub fn multi_asset(&self) -> &MultiAsset {
        &self.multi_asset
    }

    pub fn is_lovelace_only(&self) -> bool {
        self.multi_asset.is_empty()
    }

    /// Quantity of a native token, zero when absent.
    pub fn quantity_of(&self, policy: &PolicyId, name: &AssetName) -> u64 {
        self.multi_asset
            .iter()
            .find(|(p, _)| p == policy)
            .and_then(|(_, tokens)| tokens.iter().find(|(n, _)| n == name))
            .map(|(_, q)| *q)
            .unwrap_or(0)
    }

    /// Copy with policies and tokens sorted by raw bytes.
    pub fn canonical(&self) -> Self {
        let mut multi_asset = self.multi_asset.clone();
        multi_asset.sort_by(|a, b| a.0.cmp(&b.0));
        for (_, tokens) in &mut multi_asset {
            tokens.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        }
        Self {
            coin: self.coin,
            multi_asset,
        }
    }

    pub fn ordered(&self, order: ValueOrder) -> Self {
        match order {
            ValueOrder::Insertion => self.clone(),
            ValueOrder::Canonical => self.canonical(),
        }
    }

    /// Back to flat entries; the coin always comes first, zero included.
    pub fn flatten(&self) -> Vec<FlatAsset> {
        let mut out = vec![(AssetId::Lovelace, self.coin)];
        for (policy, tokens) in &self.multi_asset {
            for (name, quantity) in tokens {
                out.push((AssetId::native(*policy, name.clone()), *quantity));
            }
        }
        out
    }

    /// Ledger CBOR encoding.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf);
        buf
    }

    /// `coin` alone, or `[coin, {policy: {name: qty}}]`.
    pub fn encode_to(&self, buf: &mut Vec<u8>) {
        if self.multi_asset.is_empty() {
            encode_uint(buf, major::UNSIGNED, self.coin);
            return;
        }
        encode_array_header(buf, 2);
        encode_uint(buf, major::UNSIGNED, self.coin);
        encode_map_header(buf, self.multi_asset.len());
        for (policy, tokens) in &self.multi_asset {
            encode_bytes(buf, policy.as_bytes());
            encode_map_header(buf, tokens.len());
            for (name, quantity) in tokens {
                encode_bytes(buf, name.as_bytes());
                encode_uint(buf, major::UNSIGNED, *quantity);
            }
        }
    }
}

/// The Plutus view always carries the base unit as `{"": {"": coin}}` first.
impl ToPlutusData for Value {
    fn to_plutus_data(&self) -> PlutusData {
        let mut entries = Vec::with_capacity(self.multi_asset.len() + 1);
        entries.push((
            PlutusData::Bytes(Vec::new()),
            PlutusData::map(vec![(PlutusData::Bytes(Vec::new()), PlutusData::integer(self.coin))]),
        ));
        for (policy, tokens) in &self.multi_asset {
            let inner = tokens
                .iter()
                .map(|(name, q)| (PlutusData::bytes(name.as_bytes()), PlutusData::integer(*q)))
                .collect();
            entries.push((PlutusData::bytes(policy.as_bytes()), PlutusData::map(inner)));
        }
        PlutusData::map(entries)
    }
}

impl FromPlutusData for Value {
    fn from_plutus_data(data: &PlutusData) -> Result<Self> {
        let outer = match data {
            PlutusData::Map(entries) => entries,
            _ => return Err(CoreError::MalformedData("value must be a map".into())),
        };
        let mut flat = Vec::new();
        for (policy, tokens) in outer {
            let policy = expect_bytes(policy, "policy id")?;
            let tokens = match tokens {
                PlutusData::Map(tokens) => tokens,
                _ => return Err(CoreError::MalformedData("token map expected".into())),
            };
            for (name, quantity) in tokens {
                let name = expect_bytes(name, "asset name")?;
                let quantity = u64::try_from(expect_int(quantity, "quantity")?)
                    .map_err(|_| CoreError::MalformedData("quantity out of range".into()))?;
                if quantity == 0 && !policy.is_empty() {
                    return Err(CoreError::MalformedData(format!(
                        "zero quantity for asset {}{}",
                        hex::encode(policy),
                        hex::encode(name)
                    )));
                }
                let asset = if policy.is_empty() {
                    if !name.is_empty() {
                        return Err(CoreError::MalformedData(
                            "base unit cannot carry a token name".into(),
                        ));
                    }
                    AssetId::Lovelace
                } else {
                    AssetId::native(PolicyId::try_from(policy)?, AssetName::new(name.to_vec())?)
                };
                flat.push((asset, quantity));
            }
        }
        Self::from_flat(&flat)
    }
}
