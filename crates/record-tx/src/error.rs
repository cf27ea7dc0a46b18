//! Error types for the record flows.

use record_tx_builder::{BuildError, RedeemerError, SelectionError};
use record_tx_core::{CoreError, OutputReference};
use record_tx_script::ScriptError;
use thiserror::Error;

/// Errors that can occur while planning a record transaction.
#[derive(Debug, Error)]
pub enum Error {
    /// Core encoding error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Blueprint or parameterization error.
    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    /// Output construction error.
    #[error("build error: {0}")]
    Build(#[from] BuildError),

    /// No suitable funding input.
    #[error("selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Redeemer encoding error.
    #[error("redeemer error: {0}")]
    Redeemer(#[from] RedeemerError),

    /// The chosen input was consumed before submission. Reported by the
    /// submission layer; a fresh snapshot may succeed.
    #[error("input {0} was already spent; refresh the wallet UTxOs and retry")]
    InputAlreadySpent(OutputReference),
}

impl Error {
    /// Whether retrying with fresh chain state may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::InputAlreadySpent(_))
    }

    /// Whether the message is meant for the end user.
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Error::Selection(SelectionError::NoMatch { .. }) | Error::InputAlreadySpent(_)
        )
    }
}

/// Result type for record operations.
pub type Result<T> = std::result::Result<T, Error>;
