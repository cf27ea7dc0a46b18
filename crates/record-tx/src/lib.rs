//! # Record TX
//!
//! The unified API for planning record transactions on a UTxO ledger.
//!
//! ## Overview
//!
//! A record is an on-chain, append-only list of accounts anchored by a
//! one-shot minting policy. This crate plans the two transactions that
//! grow it:
//!
//! - **Initiate record**: select a funding UTxO, bind the minting policy to
//!   it, and lock the head token at the policy's address
//! - **Mint new account**: hash the username, derive the account key, and
//!   mint the account token with its datum
//!
//! Plans contain scripts, outputs, mints and redeemers; balancing, signing
//! and submission are left to the caller's transaction assembler.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use record_tx::{CoreConfig, RecordTx};
//! use record_tx::script::Blueprint;
//!
//! fn example(utxos: Vec<record_tx::builder::Utxo>, me: record_tx::core::Address) -> record_tx::Result<()> {
//!     let blueprint = Arc::new(Blueprint::from_path("plutus.json")?);
//!     let record = RecordTx::new(CoreConfig::default(), blueprint);
//!
//!     let plan = record.initiate_record(&utxos, me)?;
//!     println!("record policy: {}", plan.record_script.policy_id());
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `record_tx::core` - identifiers, Plutus data, addresses, assets and values
//! - `record_tx::script` - blueprints, UPLC and parameterization
//! - `record_tx::builder` - outputs, selection, redeemers and datums

pub mod config;
pub mod error;
pub mod record;

// Re-export component crates
pub use record_tx_builder as builder;
pub use record_tx_core as core;
pub use record_tx_script as script;

// Re-export main types for convenience
pub use config::CoreConfig;
pub use error::{Error, Result};
pub use record::{AccountMintPlan, AccountRequest, InitiateRecordPlan, RecordTx};

// Re-export commonly used types
pub use record_tx_builder::{CredentialDeriver, OutputBuilder, RecordMint, TxOutput, Utxo};
pub use record_tx_core::{Address, Assets, Network, OutputReference, PlutusData, Value};
pub use record_tx_script::{AppliedScript, Blueprint, Script, ScriptType};
