//! Error types for the core primitives.

use thiserror::Error;

/// Errors that can occur while parsing or encoding core ledger structures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A unit string could not be split into policy id and token name.
    #[error("malformed unit {unit:?}: {reason}")]
    MalformedUnit { unit: String, reason: &'static str },

    /// More than one lovelace entry reached the value encoder.
    #[error("multiple base-unit entries in asset list")]
    MultipleBaseUnitEntries,

    /// A fixed-width identifier had the wrong length.
    #[error("invalid {what} length: expected {expected} bytes, got {got}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// An asset name exceeded the ledger's 32-byte limit.
    #[error("asset name is {0} bytes, maximum is 32")]
    AssetNameTooLong(usize),

    /// Hex decoding failed.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Summing quantities of the same asset overflowed.
    #[error("quantity overflow for asset {0}")]
    QuantityOverflow(String),

    /// Address bytes or text did not describe a supported Shelley address.
    #[error("malformed address: {0}")]
    MalformedAddress(String),

    /// Plutus data did not have the expected shape.
    #[error("malformed plutus data: {0}")]
    MalformedData(String),

    /// CBOR decoding error.
    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
