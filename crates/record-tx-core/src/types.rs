//! Strong type definitions for ledger identifiers.
//!
//! All identifiers are newtypes to prevent misuse at compile time: a key hash
//! can never be passed where a policy id is expected, even though both are
//! 28 bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{blake2b_224, blake2b_256};
use crate::error::{CoreError, Result};
use crate::plutus_data::{expect_constr, expect_int, FromPlutusData, PlutusData, ToPlutusData};

/// Quantity of the ledger's base unit.
pub type Lovelace = u64;

macro_rules! fixed_hash {
    ($(#[$meta:meta])* $name:ident, $len:expr, $what:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Width in bytes.
            pub const LEN: usize = $len;

            /// Create from raw bytes.
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Convert to hex string.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse from hex string.
            pub fn from_hex(s: &str) -> Result<Self> {
                let bytes = hex::decode(s)?;
                Self::try_from(bytes.as_slice())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = CoreError;

            fn try_from(slice: &[u8]) -> Result<Self> {
                let arr: [u8; $len] = slice.try_into().map_err(|_| CoreError::InvalidLength {
                    what: $what,
                    expected: $len,
                    got: slice.len(),
                })?;
                Ok(Self(arr))
            }
        }
    };
}

fixed_hash!(
    /// Blake2b-224 hash of a verification key.
    KeyHash,
    28,
    "key hash"
);

fixed_hash!(
    /// Blake2b-224 hash of a tagged script.
    ScriptHash,
    28,
    "script hash"
);

fixed_hash!(
    /// Identifier of a minting policy (the hash of its script).
    PolicyId,
    28,
    "policy id"
);

fixed_hash!(
    /// Blake2b-256 hash of a transaction body.
    TxHash,
    32,
    "transaction hash"
);

fixed_hash!(
    /// Blake2b-256 hash of a datum's CBOR bytes.
    DatumHash,
    32,
    "datum hash"
);

impl KeyHash {
    /// Hash a raw verification key.
    pub fn of_verification_key(key: &[u8]) -> Self {
        Self(blake2b_224(key))
    }
}

impl DatumHash {
    /// Hash the CBOR encoding of a datum.
    pub fn of_cbor(cbor: &[u8]) -> Self {
        Self(blake2b_256(cbor))
    }
}

impl From<ScriptHash> for PolicyId {
    fn from(hash: ScriptHash) -> Self {
        Self(hash.0)
    }
}

/// Name of a native asset under a policy: 0 to 32 raw bytes.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetName(Vec<u8>);

impl AssetName {
    /// Maximum length accepted by the ledger.
    pub const MAX_LEN: usize = 32;

    /// Create from raw bytes, rejecting names longer than 32 bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() > Self::MAX_LEN {
            return Err(CoreError::AssetNameTooLong(bytes.len()));
        }
        Ok(Self(bytes))
    }

    /// The empty asset name.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::new(hex::decode(s)?)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetName({})", self.to_hex())
    }
}

impl AsRef<[u8]> for AssetName {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Reference to a single transaction output.
///
/// A UTxO can be consumed at most once, so an `OutputReference` is a
/// globally unique anchor for parameterized scripts.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputReference {
    /// Hash of the transaction that produced the output.
    pub tx_hash: TxHash,
    /// Position of the output in that transaction.
    pub index: u64,
}

impl OutputReference {
    pub const fn new(tx_hash: TxHash, index: u64) -> Self {
        Self { tx_hash, index }
    }
}

impl fmt::Debug for OutputReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputReference({}#{})", self.tx_hash, self.index)
    }
}

impl fmt::Display for OutputReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_hash, self.index)
    }
}

/// `Constr 0 [Constr 0 [tx_hash], index]`
impl ToPlutusData for OutputReference {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::constr(
            0,
            vec![
                PlutusData::constr(0, vec![PlutusData::bytes(self.tx_hash.0)]),
                PlutusData::integer(self.index),
            ],
        )
    }
}

impl FromPlutusData for OutputReference {
    fn from_plutus_data(data: &PlutusData) -> Result<Self> {
        let fields = expect_constr(data, 0, 2, "output reference")?;
        let tx_id = expect_constr(&fields[0], 0, 1, "transaction id")?;
        let hash = match &tx_id[0] {
            PlutusData::Bytes(b) => TxHash::try_from(b.as_slice())?,
            _ => return Err(CoreError::MalformedData("transaction id must be bytes".into())),
        };
        let index = u64::try_from(expect_int(&fields[1], "output index")?)
            .map_err(|_| CoreError::MalformedData("output index out of range".into()))?;
        Ok(Self::new(hash, index))
    }
}
