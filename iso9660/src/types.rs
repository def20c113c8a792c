//! Common types and constants.

use alloc::string::String;

use crate::utils::datetime::RecordDate;
use crate::utils::sector::sectors_for_bytes;

/// The volume descriptor sits at this fixed logical block.
pub const VOLUME_DESCRIPTOR_LBA: u32 = 16;

/// Minimum directory record length (33 fixed bytes + 1 name byte).
pub const MIN_RECORD_LENGTH: usize = 34;

/// Decoded flag bitmask from a directory record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFlags {
    /// Entry existence bit.
    pub exists: bool,
    /// Entry is a directory, not a file.
    pub directory: bool,
    /// Associated file.
    pub associated: bool,
    /// Record has an extended attribute record.
    pub extended_attr: bool,
    /// Permissions recorded in extended attributes.
    pub protection: bool,
    /// Not the final record of a multi-extent file.
    pub multi_extent: bool,
}

impl RecordFlags {
    /// Decode the on-disc bitmask.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            exists: bits & 0x01 != 0,
            directory: bits & 0x02 != 0,
            associated: bits & 0x04 != 0,
            extended_attr: bits & 0x08 != 0,
            protection: bits & 0x10 != 0,
            multi_extent: bits & 0x80 != 0,
        }
    }
}

/// Decoded directory record: one file or sub-directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Extent start block.
    pub extent_lba: u32,
    /// Extent data length in bytes.
    pub data_length: u32,
    /// Recording date and time.
    pub date: RecordDate,
    /// Flag bitmask.
    pub flags: RecordFlags,
    /// File unit size for interleaved files.
    pub unit_size: u8,
    /// Interleave gap size.
    pub interleave_gap: u8,
    /// Volume sequence id.
    pub volume_sequence: u16,
    /// Entry name, version suffix stripped.
    pub name: String,
}

impl DirectoryRecord {
    /// Whether this record describes a directory.
    pub fn is_directory(&self) -> bool {
        self.flags.directory
    }

    /// Whether this record describes a regular file.
    pub fn is_file(&self) -> bool {
        !self.flags.directory
    }

    /// Whole sectors backing this record's extent.
    pub fn sector_count(&self) -> u32 {
        sectors_for_bytes(self.data_length)
    }

    /// The single-byte 0x00/0x01 self/parent entries present at the start
    /// of every directory extent; never a resolution result.
    pub(crate) fn is_pseudo(&self) -> bool {
        matches!(self.name.as_bytes(), [0x00] | [0x01])
    }
}
