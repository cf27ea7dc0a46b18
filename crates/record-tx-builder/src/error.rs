//! Error types for output construction, input selection and redeemers.

use thiserror::Error;

use record_tx_core::CoreError;
use record_tx_script::ScriptError;

/// Errors raised while assembling a transaction output.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A declarative output was finalized without a required part.
    #[error("incomplete output: missing {0}")]
    IncompleteOutput(&'static str),

    /// A reference script carried an unrecognized type tag.
    #[error("unsupported script type: {0}")]
    UnsupportedScriptType(String),

    /// The datum was not a single well-formed CBOR data item.
    #[error("invalid datum: {0}")]
    InvalidDatum(String),

    /// Error from script handling.
    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    /// Error from the core primitives.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Errors raised by the UTxO selector.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// No UTxO in the snapshot satisfied the predicate.
    #[error("no UTxO matches: wanted {wanted} ({scanned} scanned)")]
    NoMatch { wanted: String, scanned: usize },
}

/// Errors raised while encoding redeemers.
#[derive(Debug, Error)]
pub enum RedeemerError {
    /// Usernames must be non-empty.
    #[error("username is empty")]
    EmptyUsername,

    /// The digest was shorter than the fixed on-chain width.
    #[error("hash length mismatch: expected at least {expected} bytes, got {got}")]
    HashLengthMismatch { expected: usize, got: usize },

    /// The external credential deriver failed.
    #[error("credential derivation failed: {0}")]
    Derivation(String),
}

/// Result type for output construction.
pub type Result<T> = std::result::Result<T, BuildError>;
