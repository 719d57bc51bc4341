use std::result::Result as StdResult;

use thiserror::Error;

/// Error type shared by the dues and ledger engine.
#[derive(Debug, Error)]
pub enum DuesError {
    #[error("Invalid cadence: {0}")]
    InvalidCadence(String),
    #[error("Malformed record {record}: {reason}")]
    MalformedRecord { record: String, reason: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl DuesError {
    pub fn malformed(record: impl Into<String>, reason: impl Into<String>) -> Self {
        DuesError::MalformedRecord {
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// True for configuration-level failures that block dues computation.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DuesError::InvalidCadence(_))
    }
}

pub type Result<T> = StdResult<T, DuesError>;
