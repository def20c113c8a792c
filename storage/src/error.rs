//! Error types shared across storage backends

use core::fmt;

/// Result type for storage operations
pub type Result<T> = core::result::Result<T, StorageError>;

/// Errors that can occur while opening or loading assets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// File or directory not found
    NotFound,

    /// The device reported a command or transfer failure
    Device,

    /// Malformed volume descriptor
    InvalidDescriptor,

    /// Corrupted directory record
    InvalidRecord,

    /// A bounded wait exceeded its bound
    Timeout,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "file or directory not found"),
            Self::Device => write!(f, "device command failed"),
            Self::InvalidDescriptor => write!(f, "malformed volume descriptor"),
            Self::InvalidRecord => write!(f, "corrupted directory record"),
            Self::Timeout => write!(f, "wait exceeded its bound"),
        }
    }
}
