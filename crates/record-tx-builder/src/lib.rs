//! # Record TX Builder
//!
//! The pieces of a record transaction that are handed to an external
//! assembler:
//!
//! - [`OutputBuilder`] / [`OutputSpec`] - transaction outputs
//! - [`select_first`] - funding input selection over a UTxO snapshot
//! - [`RecordMint`] - minting policy redeemers
//! - [`AccountDatum`], [`Entry`], [`Contributor`] - datums at the record script
//!
//! Nothing here signs, balances or submits a transaction.

pub mod datum;
pub mod error;
pub mod output;
pub mod redeemer;
pub mod selector;

pub use datum::{AccountDatum, Contributor, Entry};
pub use error::{BuildError, RedeemerError, Result, SelectionError};
pub use output::{
    AcceptsDatum, AcceptsValue, AddressSet, DatumAttached, DatumOption, InlineDatum,
    OutputBuilder, OutputSpec, ScriptAttached, ScriptRefSpec, TxOutput, ValueAttached,
};
pub use redeemer::{CredentialDeriver, RecordMint, UsernameHash};
pub use selector::{select_first, LovelaceOnlyAtLeast, Utxo, UtxoPredicate};
