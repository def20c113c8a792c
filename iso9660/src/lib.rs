//! Read-only ISO9660 filesystem reader.
//!
//! Loads game assets from removable read-only media through the engine's
//! shared storage contract. The filesystem is generic over
//! [`storage::SectorDevice`], so the same code runs on top of the disc
//! controller driver on target and on top of any block device on a host.
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Volume layer** ([`volume`]) - decodes the volume descriptor at the
//!    fixed block and extracts the root directory record
//! 2. **Directory layer** ([`directory`]) - walks directory extents to
//!    resolve slash-separated paths
//! 3. **File layer** ([`file`]) - byte-stream reads over sector-granular
//!    transfers, with a one-sector read-through cache per handle
//!
//! # Usage
//!
//! ```ignore
//! use iso9660::DiscFileSystem;
//! use storage::Storage;
//!
//! let fs = DiscFileSystem::new(&driver)?;
//! let mut file = fs.open_file("MODELS/HERO.MDL")?;
//! let n = file.read(&mut buffer);
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

pub mod device;
pub mod directory;
pub mod file;
pub mod fs;
pub mod types;
pub mod utils;
pub mod volume;

pub use device::BlockIoDevice;
pub use directory::resolve;
pub use file::DiscFile;
pub use fs::DiscFileSystem;
pub use types::{DirectoryRecord, RecordFlags, VOLUME_DESCRIPTOR_LBA};
pub use volume::VolumeDescriptor;

// The shared contract, re-exported for callers that only pull in this crate.
pub use storage::{File, Result, SectorDevice, Storage, StorageError, SECTOR_SIZE};
