//! Directory record decoding and path resolution.

use alloc::string::String;

use storage::{Result, SectorDevice, StorageError};

use crate::types::{DirectoryRecord, RecordFlags, MIN_RECORD_LENGTH};
use crate::utils::cursor::ByteCursor;
use crate::utils::datetime::RecordDate;
use crate::utils::sector::ExtentBuf;
use crate::utils::string::strip_version;

/// Decode one directory record at the start of `data`.
///
/// Returns the record and the number of bytes it occupies. The caller is
/// responsible for skipping zero-length padding bytes before calling.
pub fn decode_record(data: &[u8]) -> Result<(DirectoryRecord, usize)> {
    let mut cursor = ByteCursor::new(data);
    let field = StorageError::InvalidRecord;

    let length = cursor.u8().ok_or(field)? as usize;
    if length < MIN_RECORD_LENGTH || length > data.len() {
        return Err(field);
    }

    cursor.skip(1).ok_or(field)?; // extended attribute record length
    let extent_lba = cursor.both_u32().ok_or(field)?;
    let data_length = cursor.both_u32().ok_or(field)?;
    let date = RecordDate::from_bytes(cursor.array::<7>().ok_or(field)?);
    let flags = RecordFlags::from_bits(cursor.u8().ok_or(field)?);
    let unit_size = cursor.u8().ok_or(field)?;
    let interleave_gap = cursor.u8().ok_or(field)?;
    let volume_sequence = cursor.both_u16().ok_or(field)?;
    let name_length = cursor.u8().ok_or(field)? as usize;
    if name_length == 0 || 33 + name_length > length {
        return Err(field);
    }
    let raw_name = cursor.bytes(name_length).ok_or(field)?;

    let name = if raw_name.len() == 1 && raw_name[0] <= 0x01 {
        // self/parent pseudo-entry; keep the marker byte as the name
        String::from_utf8_lossy(raw_name).into_owned()
    } else {
        let decoded = String::from_utf8_lossy(raw_name);
        String::from(strip_version(&decoded))
    };

    Ok((
        DirectoryRecord {
            extent_lba,
            data_length,
            date,
            flags,
            unit_size,
            interleave_gap,
            volume_sequence,
            name,
        },
        length,
    ))
}

/// Resolve a slash-separated `path` against the directory `start`.
///
/// An empty path resolves to `start` itself. Otherwise the entire extent of
/// `start` is loaded into a fresh scratch buffer and scanned linearly:
/// padding bytes are skipped one at a time, self/parent pseudo-entries are
/// never returned, and names match on exact bytes with no case folding
/// (version suffixes are stripped at decode). A matching directory with
/// path left to walk is descended into; a matching file with path left is
/// not (the scan continues over its siblings).
pub fn resolve<D: SectorDevice>(
    dev: &D,
    start: &DirectoryRecord,
    path: &str,
) -> Result<DirectoryRecord> {
    if path.is_empty() {
        return Ok(start.clone());
    }

    let (component, rest) = match path.split_once('/') {
        Some((component, rest)) => (component, rest),
        None => (path, ""),
    };
    if component.is_empty() {
        // tolerate leading and doubled separators
        return resolve(dev, start, rest);
    }

    let extent_len = start.data_length as usize;
    let mut scratch = ExtentBuf::new(start.sector_count() as usize);
    dev.read_sectors(start.extent_lba, scratch.as_mut_bytes())?;

    let extent = &scratch.as_bytes()[..extent_len.min(scratch.as_bytes().len())];
    let mut offset = 0;
    while offset < extent.len() {
        if extent[offset] == 0 {
            // padding at the end of a sector
            offset += 1;
            continue;
        }

        let (entry, consumed) = decode_record(&extent[offset..])?;
        offset += consumed;

        if entry.is_pseudo() {
            continue;
        }
        if entry.name.as_bytes() != component.as_bytes() {
            continue;
        }

        if rest.is_empty() {
            return Ok(entry);
        }
        if entry.is_directory() {
            return resolve(dev, &entry, rest);
        }
        // a file cannot be descended into; keep scanning siblings
    }

    Err(StorageError::NotFound)
}
