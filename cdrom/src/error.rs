//! Driver error types

use core::fmt;
use storage::StorageError;

/// Errors reported by the controller driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdError {
    /// The error interrupt fired during a command or transfer
    CommandFailed,

    /// A bounded wait exceeded its bound
    Timeout,
}

impl fmt::Display for CdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandFailed => write!(f, "controller command failed"),
            Self::Timeout => write!(f, "controller wait timed out"),
        }
    }
}

impl From<CdError> for StorageError {
    fn from(err: CdError) -> Self {
        match err {
            CdError::CommandFailed => StorageError::Device,
            CdError::Timeout => StorageError::Timeout,
        }
    }
}
