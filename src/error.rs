//! Crate-level error type.
//!
//! Device conditions (a board answering `ERROR`, a missed event) are never
//! errors here; capability calls report them as `false` or `None`. This type
//! covers what a test script cannot recover from: bad arguments, missing
//! benches, broken configuration.

use crate::config::ConfigError;
use crate::inventory::InventoryError;
use crate::port::PortError;
use thiserror::Error;

/// Unified error type for setup, configuration and contract violations.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A caller passed a value no board could accept (malformed address,
    /// out-of-range field).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No unlocked inventory entry matches the requested board.
    #[error("No available device for model {model} revision {revision}")]
    NoDevice { model: String, revision: String },

    /// Bench setup failed after the configured retries.
    #[error("Test bench setup failed: {0}")]
    Setup(String),

    /// Logging could not be initialised.
    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl HarnessError {
    /// Create an InvalidArgument error from a message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a Setup error from a message.
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup(message.into())
    }
}

/// Result alias used across the crate.
pub type HarnessResult<T> = Result<T, HarnessError>;
