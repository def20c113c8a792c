//! Volume descriptor decoding.
//!
//! The descriptor is one 2048-byte sector at the fixed block, read once at
//! filesystem construction and retained for its lifetime. A malformed
//! descriptor is a recoverable error: a bad disc must not take down the
//! engine.

use alloc::string::String;

use storage::{Result, SectorDevice, StorageError, SECTOR_SIZE};

use crate::directory::decode_record;
use crate::types::{DirectoryRecord, VOLUME_DESCRIPTOR_LBA};
use crate::utils::cursor::ByteCursor;
use crate::utils::sector::SectorBuf;
use crate::utils::string::decode_identifier;

/// Descriptor type code for the primary volume descriptor.
const TYPE_PRIMARY: u8 = 1;
/// Standard identifier, present in every descriptor.
const MAGIC: &[u8; 5] = b"CD001";
/// Supported descriptor version.
const VERSION: u8 = 1;

/// Decoded volume descriptor.
#[derive(Debug, Clone)]
pub struct VolumeDescriptor {
    /// System identifier, space padding trimmed.
    pub system_id: String,
    /// Volume identifier, space padding trimmed.
    pub volume_id: String,
    /// Volume size in logical blocks.
    pub volume_blocks: u32,
    /// Number of volumes in the set.
    pub volume_set_size: u16,
    /// This volume's sequence number in the set.
    pub volume_sequence: u16,
    /// Logical block size in bytes.
    pub logical_block_size: u16,
    /// Path table size in bytes.
    pub path_table_size: u32,
    /// Path table location.
    pub path_table_lba: u32,
    /// Optional path table location (0 if absent).
    pub opt_path_table_lba: u32,
    /// Embedded root directory record.
    pub root: DirectoryRecord,
}

/// Read and decode the volume descriptor at the fixed block.
pub fn read_volume_descriptor<D: SectorDevice>(dev: &D) -> Result<VolumeDescriptor> {
    let mut sector = SectorBuf::new();
    dev.read_sectors(VOLUME_DESCRIPTOR_LBA, &mut sector.0)?;
    decode_volume_descriptor(&sector.0)
}

/// Decode a volume descriptor from one sector of bytes.
pub fn decode_volume_descriptor(sector: &[u8]) -> Result<VolumeDescriptor> {
    if sector.len() < SECTOR_SIZE {
        return Err(StorageError::InvalidDescriptor);
    }

    let mut cursor = ByteCursor::new(sector);
    let field = StorageError::InvalidDescriptor;

    let type_code = cursor.u8().ok_or(field)?;
    let magic = cursor.array::<5>().ok_or(field)?;
    let version = cursor.u8().ok_or(field)?;
    if type_code != TYPE_PRIMARY || &magic != MAGIC || version != VERSION {
        log::warn!("iso9660: rejecting volume descriptor (type {})", type_code);
        return Err(StorageError::InvalidDescriptor);
    }

    cursor.skip(1).ok_or(field)?; // reserved
    let system_id = decode_identifier(cursor.bytes(32).ok_or(field)?);
    let volume_id = decode_identifier(cursor.bytes(32).ok_or(field)?);
    cursor.skip(8).ok_or(field)?; // reserved
    let volume_blocks = cursor.both_u32().ok_or(field)?;
    cursor.skip(32).ok_or(field)?; // reserved
    let volume_set_size = cursor.both_u16().ok_or(field)?;
    let volume_sequence = cursor.both_u16().ok_or(field)?;
    let logical_block_size = cursor.both_u16().ok_or(field)?;
    let path_table_size = cursor.both_u32().ok_or(field)?;
    let path_table_lba = cursor.le_u32().ok_or(field)?;
    let opt_path_table_lba = cursor.le_u32().ok_or(field)?;
    cursor.skip(8).ok_or(field)?; // big-endian path table locations

    let root_bytes = cursor.bytes(34).ok_or(field)?;
    let (root, _) = decode_record(root_bytes).map_err(|_| field)?;

    Ok(VolumeDescriptor {
        system_id,
        volume_id,
        volume_blocks,
        volume_set_size,
        volume_sequence,
        logical_block_size,
        path_table_size,
        path_table_lba,
        opt_path_table_lba,
        root,
    })
}
