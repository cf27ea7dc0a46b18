//! # Record TX Testkit
//!
//! Testing utilities for the record transaction crates.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: test wallets, a sample blueprint and a deterministic
//!   credential deriver
//! - **Generators**: proptest strategies for identifiers, assets, addresses
//!   and Plutus data
//! - **Golden vectors**: known inputs with expected ledger bytes
//!
//! ## Golden Vectors
//!
//! ```rust
//! use record_tx_testkit::vectors::{all_vectors, verify_all_vectors};
//!
//! for (name, ok, detail) in verify_all_vectors() {
//!     assert!(ok, "{}: {}", name, detail);
//! }
//! assert!(!all_vectors().is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use record_tx_testkit::generators::assets;
//!
//! proptest! {
//!     #[test]
//!     fn value_never_holds_zero(assets in assets()) {
//!         let value = record_tx_core::Value::from_assets(&assets).unwrap();
//!         prop_assert!(value.multi_asset().iter().all(|(_, t)| t.iter().all(|(_, q)| *q > 0)));
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_blueprint, TestDeriver, TestFixture, TestWallet, SAMPLE_BLUEPRINT};
pub use vectors::{all_vectors, GoldenVector};
