//! # Record TX Core
//!
//! Pure primitives for building record transactions: ledger identifiers,
//! deterministic CBOR, Plutus structured data, addresses, and the asset/value
//! model.
//!
//! This crate contains no I/O, no storage, no networking. Every function is a
//! pure computation over its inputs.
//!
//! ## Key Types
//!
//! - [`Assets`] - Sparse unit-string → quantity mapping, as supplied by wallets
//! - [`AssetId`] - Either lovelace or a native asset (policy + name)
//! - [`Value`] - Ledger value: coin plus a grouped multi-asset tree
//! - [`PlutusData`] - Structured data for datums, redeemers and parameters
//! - [`Address`] - Shelley address with payment and optional stake credential
//! - [`OutputReference`] - (tx hash, index) pair identifying one UTxO
//!
//! ## Encoding
//!
//! All ledger structures are written with the deterministic CBOR writer in the
//! [`canonical`] module, so the same input always yields the same bytes.

pub mod address;
pub mod assets;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod plutus_data;
pub mod types;
pub mod value;

pub use address::{Address, Credential, Network, Pointer, StakeCredential};
pub use assets::{flatten_assets, AssetId, Assets, FlatAsset, LOVELACE_UNIT};
pub use error::{CoreError, Result};
pub use plutus_data::{FromPlutusData, PlutusData, ToPlutusData};
pub use types::{
    AssetName, DatumHash, KeyHash, Lovelace, OutputReference, PolicyId, ScriptHash, TxHash,
};
pub use value::{MultiAsset, Value, ValueOrder};
