//! Error types for script handling.

use thiserror::Error;

use record_tx_core::CoreError;

/// Errors that can occur while loading, decoding or parameterizing scripts.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// No validator with this title exists in the blueprint.
    #[error("validator {0:?} not found in blueprint")]
    ScriptNotFound(String),

    /// The number of supplied parameters differs from the declared arity.
    #[error("validator {title:?} expects {expected} parameters, got {got}")]
    ParameterArityMismatch {
        title: String,
        expected: usize,
        got: usize,
    },

    /// A script type tag or name is not one of native, v1, v2, v3.
    #[error("unsupported script type: {0}")]
    UnsupportedScriptType(String),

    /// Compiled code is not a CBOR-wrapped program.
    #[error("malformed script: {0}")]
    MalformedScript(String),

    /// The flat-encoded program could not be decoded.
    #[error("flat decoding error at bit {position}: {reason}")]
    FlatDecode { position: usize, reason: String },

    /// Blueprint JSON could not be parsed.
    #[error("blueprint error: {0}")]
    Blueprint(#[from] serde_json::Error),

    /// I/O error while reading a blueprint file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the core primitives.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for script operations.
pub type Result<T> = std::result::Result<T, ScriptError>;
