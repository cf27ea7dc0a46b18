//! Redeemers of the record minting policy.
//!
//! Usernames never appear on chain. They are hashed with SHA-256 and the
//! first digest byte is dropped; that slot is taken by a label byte when the
//! hash is used as a token name.

use std::fmt;

use record_tx_core::crypto::sha256;
use record_tx_core::plutus_data::expect_bytes;
use record_tx_core::{CoreError, FromPlutusData, PlutusData, ToPlutusData};

use crate::error::RedeemerError;
use crate::output::TxOutput;

const HASH_LEN: usize = 31;

/// The 31-byte on-chain identifier of a username.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsernameHash([u8; HASH_LEN]);

impl UsernameHash {
    pub const LEN: usize = HASH_LEN;

    /// Hash a raw username.
    pub fn from_username(username: &str) -> Result<Self, RedeemerError> {
        if username.is_empty() {
            return Err(RedeemerError::EmptyUsername);
        }
        Self::from_digest(&sha256(username.as_bytes()))
    }

    /// Take everything after the first byte of `digest`.
    pub fn from_digest(digest: &[u8]) -> Result<Self, RedeemerError> {
        let tail = digest.get(1..).unwrap_or_default();
        if tail.len() < Self::LEN {
            return Err(RedeemerError::HashLengthMismatch {
                expected: Self::LEN + 1,
                got: digest.len(),
            });
        }
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(&tail[..Self::LEN]);
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// `label ‖ hash`, a full 32-byte asset name.
    pub fn token_name(&self, label: u8) -> [u8; HASH_LEN + 1] {
        let mut name = [0u8; HASH_LEN + 1];
        name[0] = label;
        name[1..].copy_from_slice(&self.0);
        name
    }
}

impl fmt::Debug for UsernameHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UsernameHash({})", hex::encode(self.0))
    }
}

impl ToPlutusData for UsernameHash {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::bytes(self.0)
    }
}

impl FromPlutusData for UsernameHash {
    fn from_plutus_data(data: &PlutusData) -> record_tx_core::Result<Self> {
        let bytes = expect_bytes(data, "username hash")?;
        let arr: [u8; HASH_LEN] = bytes.try_into().map_err(|_| CoreError::InvalidLength {
            what: "username hash",
            expected: HASH_LEN,
            got: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

/// Derives an account's public key from its username hash and password.
///
/// The derivation scheme belongs to the wallet; it is injected so the
/// password never leaves the caller's chosen implementation.
pub trait CredentialDeriver {
    fn derive_public_key(
        &self,
        username: &UsernameHash,
        password: &str,
    ) -> Result<Vec<u8>, RedeemerError>;
}

/// Actions of the record minting policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordMint {
    /// Create the record's head token.
    InitiateRecord,
    /// Register a new account.
    MintNewAccount {
        username: UsernameHash,
        outputs: Vec<TxOutput>,
    },
}

impl RecordMint {
    /// `MintNewAccount` for a raw username. The password is not part of the
    /// redeemer; it only feeds a [`CredentialDeriver`].
    pub fn mint_new_account(username: &str, outputs: Vec<TxOutput>) -> Result<Self, RedeemerError> {
        Ok(RecordMint::MintNewAccount {
            username: UsernameHash::from_username(username)?,
            outputs,
        })
    }

    /// Ledger CBOR of the redeemer.
    pub fn to_cbor(&self) -> Vec<u8> {
        let cbor = self.to_plutus_data().to_cbor();
        tracing::debug!(action = self.name(), size = cbor.len(), "encoded redeemer");
        cbor
    }

    pub fn name(&self) -> &'static str {
        match self {
            RecordMint::InitiateRecord => "InitiateRecord",
            RecordMint::MintNewAccount { .. } => "MintNewAccount",
        }
    }
}

/// `InitiateRecord = Constr 0 []`, `MintNewAccount = Constr 1 [hash, [outputs]]`
impl ToPlutusData for RecordMint {
    fn to_plutus_data(&self) -> PlutusData {
        match self {
            RecordMint::InitiateRecord => PlutusData::constr(0, vec![]),
            RecordMint::MintNewAccount { username, outputs } => PlutusData::constr(
                1,
                vec![
                    username.to_plutus_data(),
                    PlutusData::list(outputs.iter().map(ToPlutusData::to_plutus_data).collect()),
                ],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initiate_record() {
        assert_eq!(hex::encode(RecordMint::InitiateRecord.to_cbor()), "d87980");
    }

    #[test]
    fn test_mint_new_account_alice() {
        let redeemer = RecordMint::mint_new_account("alice", vec![]).unwrap();
        assert_eq!(
            hex::encode(redeemer.to_cbor()),
            "d87a9f581fd806c97f0e00af1a1fc3328fa763a9269723c8db8fac4f93af71db186d6e9080ff"
        );
        match redeemer {
            RecordMint::MintNewAccount { username, .. } => {
                assert_eq!(username.as_bytes().len(), 31);
            }
            RecordMint::InitiateRecord => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_empty_username() {
        assert!(matches!(
            RecordMint::mint_new_account("", vec![]),
            Err(RedeemerError::EmptyUsername)
        ));
    }

    #[test]
    fn test_short_digest() {
        assert!(matches!(
            UsernameHash::from_digest(&[0u8; 20]),
            Err(RedeemerError::HashLengthMismatch { expected: 32, got: 20 })
        ));
        assert!(UsernameHash::from_digest(&[]).is_err());
    }

    #[test]
    fn test_token_name_prefixes_label() {
        let hash = UsernameHash::from_username("alice").unwrap();
        let name = hash.token_name(0x01);
        assert_eq!(name[0], 0x01);
        assert_eq!(&name[1..], hash.as_bytes());
        assert_eq!(hex::encode(&name[1..4]), "d806c9");
    }

    #[test]
    fn test_username_hash_plutus_roundtrip() {
        let hash = UsernameHash::from_username("bob").unwrap();
        let back = UsernameHash::from_plutus_data(&hash.to_plutus_data()).unwrap();
        assert_eq!(back, hash);
    }
}
