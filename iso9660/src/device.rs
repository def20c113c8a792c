//! Hosted sector-device adapter.
//!
//! Bridges any [`gpt_disk_io::BlockIo`] block device into the
//! [`SectorDevice`] contract the filesystem consumes, so the same
//! filesystem code runs over an image file or in-memory device during
//! development and testing. On target the disc controller driver
//! implements [`SectorDevice`] directly.

use core::cell::RefCell;

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;
use storage::{Result, SectorDevice, StorageError};

/// A [`SectorDevice`] over a generic block device.
///
/// `BlockIo` reads need `&mut self`; the filesystem shares its device by
/// `&self`, so the inner device sits behind a `RefCell`. Hosted use is
/// single-threaded, matching the engine's no-preemption model.
pub struct BlockIoDevice<B: BlockIo> {
    inner: RefCell<B>,
}

impl<B: BlockIo> BlockIoDevice<B> {
    /// Wrap a block device.
    pub fn new(block_io: B) -> Self {
        Self {
            inner: RefCell::new(block_io),
        }
    }

    /// Unwrap the block device.
    pub fn into_inner(self) -> B {
        self.inner.into_inner()
    }
}

impl<B: BlockIo> SectorDevice for BlockIoDevice<B> {
    fn read_sectors(&self, lba: u32, dst: &mut [u8]) -> Result<()> {
        self.inner
            .borrow_mut()
            .read_blocks(Lba(lba as u64), dst)
            .map_err(|_| StorageError::Device)
    }
}
