//! Shared storage contract for the Relic engine.
//!
//! Asset loaders never talk to a concrete backend directly: they go through
//! the [`File`] and [`Storage`] traits, implemented identically by the
//! disc-backed filesystem and by the host-development backend. This keeps
//! upstream loading code storage-agnostic.
//!
//! The crate also defines [`SectorDevice`], the sector-granular transfer
//! contract the filesystem consumes and the disc controller driver provides.
//!
//! # Usage
//!
//! ```ignore
//! use storage::Storage;
//!
//! let mut header = [0u8; 64];
//! fs.load_data(&mut header, "MODELS/HERO.MDL")?;
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

pub mod error;

pub use error::{Result, StorageError};

use alloc::vec::Vec;

/// Data sector size of the backing medium, in bytes.
///
/// Other track/sector sizes are out of scope for the engine.
pub const SECTOR_SIZE: usize = 2048;

/// An open, readable, seekable byte stream.
///
/// Sector granularity and transfer alignment of the backing medium are hidden
/// behind this trait; callers see plain byte-stream semantics.
pub trait File {
    /// Read up to `output.len()` bytes from the current offset.
    ///
    /// A request longer than the remaining file bytes is silently clamped;
    /// that is defined behavior, not an error. A device failure mid-read ends
    /// the transfer early, so the return value may be short (possibly zero).
    fn read(&mut self, output: &mut [u8]) -> usize;

    /// Move the read offset. Out-of-range offsets are clamped to
    /// `[0, size]`; returns the offset actually set.
    fn seek(&mut self, offset: u64) -> u64;

    /// Current byte offset.
    fn tell(&self) -> u64;

    /// Total file size in bytes.
    fn size(&self) -> u64;

    /// Release the handle.
    ///
    /// Backends with no exclusive OS resource implement this as a no-op, but
    /// it must exist so callers can treat all backends uniformly.
    fn close(&mut self) {}
}

/// A storage backend that resolves paths to open files.
pub trait Storage {
    /// Concrete file type produced by this backend.
    type File<'a>: File
    where
        Self: 'a;

    /// Open the file at `path`.
    fn open_file(&self, path: &str) -> Result<Self::File<'_>>;

    /// Open `path`, read up to `output.len()` bytes, close.
    ///
    /// Returns the number of bytes actually read.
    fn load_data(&self, output: &mut [u8], path: &str) -> Result<usize> {
        let mut file = self.open_file(path)?;
        let actual = file.read(output);
        file.close();
        Ok(actual)
    }

    /// Open `path`, read the whole file into a fresh buffer, close.
    fn load_vec(&self, path: &str) -> Result<Vec<u8>> {
        let mut file = self.open_file(path)?;
        let mut buffer = alloc::vec![0u8; file.size() as usize];
        let actual = file.read(&mut buffer);
        buffer.truncate(actual);
        file.close();
        Ok(buffer)
    }
}

/// Sector-granular read access to a block medium.
///
/// Implemented by the disc controller driver (DMA transfers, alignment 4) and
/// by hosted adapters over generic block devices (alignment 1). Methods take
/// `&self`: a device is constructed once and shared by reference between the
/// filesystem and every open file handle.
pub trait SectorDevice {
    /// Required destination-buffer alignment for direct hardware transfers.
    ///
    /// Callers whose buffers do not satisfy this must bounce through an
    /// aligned intermediate buffer.
    fn dma_alignment(&self) -> usize {
        1
    }

    /// Read whole sectors starting at `lba` into `dst`.
    ///
    /// `dst.len()` must be a non-zero multiple of [`SECTOR_SIZE`]. Blocks
    /// until every requested sector has been transferred or the device
    /// reports a failure.
    fn read_sectors(&self, lba: u32, dst: &mut [u8]) -> Result<()>;
}
