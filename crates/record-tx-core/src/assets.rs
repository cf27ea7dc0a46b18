//! The asset model: a sparse, insertion-ordered mapping from unit strings to
//! quantities, and its flattening into typed asset identifiers.
//!
//! A unit string is the hex policy id immediately followed by the hex asset
//! name. The base unit is written as `""` or `"lovelace"`.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::types::{AssetName, PolicyId};

/// Textual unit for the base currency.
pub const LOVELACE_UNIT: &str = "lovelace";

const POLICY_HEX_LEN: usize = PolicyId::LEN * 2;

/// Identifier of a single asset class.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetId {
    /// The ledger's base unit.
    Lovelace,
    /// A native token.
    Native { policy: PolicyId, name: AssetName },
}

impl AssetId {
    pub fn native(policy: PolicyId, name: AssetName) -> Self {
        AssetId::Native { policy, name }
    }

    /// Parse a unit string.
    pub fn from_unit(unit: &str) -> Result<Self> {
        if unit.is_empty() || unit == LOVELACE_UNIT {
            return Ok(AssetId::Lovelace);
        }
        let malformed = |reason| CoreError::MalformedUnit {
            unit: unit.to_string(),
            reason,
        };
        if unit.len() % 2 != 0 {
            return Err(malformed("odd number of hex digits"));
        }
        if unit.len() < POLICY_HEX_LEN {
            return Err(malformed("shorter than a policy id"));
        }
        if unit.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(malformed("hex digits must be lowercase"));
        }
        let bytes = hex::decode(unit).map_err(|_| malformed("not hex"))?;
        let (policy, name) = bytes.split_at(PolicyId::LEN);
        if name.len() > AssetName::MAX_LEN {
            return Err(malformed("asset name longer than 32 bytes"));
        }
        Ok(AssetId::Native {
            policy: PolicyId::try_from(policy)?,
            name: AssetName::new(name.to_vec())?,
        })
    }

    /// Render back to a unit string; the base unit renders as `"lovelace"`.
    pub fn to_unit(&self) -> String {
        match self {
            AssetId::Lovelace => LOVELACE_UNIT.to_string(),
            AssetId::Native { policy, name } => format!("{}{}", policy.to_hex(), name.to_hex()),
        }
    }

    pub fn is_lovelace(&self) -> bool {
        matches!(self, AssetId::Lovelace)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_unit())
    }
}

/// One flattened asset entry.
pub type FlatAsset = (AssetId, u64);

/// Unit string to quantity mapping.
///
/// Keys are unique; inserting an existing unit replaces its quantity in
/// place, so iteration order is the order in which units first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assets {
    entries: Vec<(String, u64)>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assets holding only the base unit.
    pub fn lovelace(quantity: u64) -> Self {
        let mut assets = Self::new();
        assets.insert(LOVELACE_UNIT, quantity);
        assets
    }

    /// Insert or replace a unit's quantity.
    pub fn insert(&mut self, unit: impl Into<String>, quantity: u64) {
        let unit = unit.into();
        match self.entries.iter_mut().find(|(u, _)| *u == unit) {
            Some(entry) => entry.1 = quantity,
            None => self.entries.push((unit, quantity)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, unit: impl Into<String>, quantity: u64) -> Self {
        self.insert(unit, quantity);
        self
    }

    /// Insert a typed asset.
    pub fn insert_asset(&mut self, asset: &AssetId, quantity: u64) {
        self.insert(asset.to_unit(), quantity);
    }

    pub fn get(&self, unit: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(u, _)| u == unit)
            .map(|(_, q)| *q)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(u, q)| (u.as_str(), *q))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Assets {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut assets = Self::new();
        for (unit, quantity) in iter {
            assets.insert(unit, quantity);
        }
        assets
    }
}

impl Serialize for Assets {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (unit, quantity) in &self.entries {
            map.serialize_entry(unit, quantity)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Assets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct AssetsVisitor;

        impl<'de> Visitor<'de> for AssetsVisitor {
            type Value = Assets;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of unit strings to quantities")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Assets, A::Error> {
                let mut assets = Assets::new();
                while let Some((unit, quantity)) = access.next_entry::<String, u64>()? {
                    assets.insert(unit, quantity);
                }
                Ok(assets)
            }
        }

        deserializer.deserialize_map(AssetsVisitor)
    }
}

/// Flatten a unit mapping into typed entries, in insertion order.
///
/// Duplicates are not merged here: `""` and `"lovelace"` are distinct keys
/// of the mapping and both flatten to [`AssetId::Lovelace`].
pub fn flatten_assets(assets: &Assets) -> Result<Vec<FlatAsset>> {
    assets
        .iter()
        .map(|(unit, quantity)| Ok((AssetId::from_unit(unit)?, quantity)))
        .collect()
}
