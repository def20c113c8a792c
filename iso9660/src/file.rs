//! Per-open-file byte-stream reads over sector transfers.

use alloc::boxed::Box;

use storage::{File, SectorDevice, SECTOR_SIZE};

use crate::types::DirectoryRecord;
use crate::utils::sector::SectorBuf;

/// An open file on the disc.
///
/// Hides sector granularity and transfer alignment from the caller: reads
/// that line up with whole sectors and an aligned destination go straight
/// from the hardware into the caller's buffer; everything else bounces
/// through the handle's one-sector cache. The cache is exclusively owned
/// by this handle.
pub struct DiscFile<'d, D: SectorDevice> {
    dev: &'d D,
    start_lba: u32,
    size: u64,
    offset: u64,
    cached_lba: Option<u32>,
    cache: Box<SectorBuf>,
}

impl<'d, D: SectorDevice> DiscFile<'d, D> {
    /// Open the file described by a resolved directory record.
    pub(crate) fn new(dev: &'d D, record: &DirectoryRecord) -> Self {
        Self {
            dev,
            start_lba: record.extent_lba,
            size: record.data_length as u64,
            offset: 0,
            cached_lba: None,
            cache: Box::new(SectorBuf::new()),
        }
    }

    /// Make `lba` the cached sector, reloading only when it differs.
    fn load_cached(&mut self, lba: u32) -> bool {
        if self.cached_lba == Some(lba) {
            return true;
        }
        if self.dev.read_sectors(lba, &mut self.cache.0).is_err() {
            log::warn!("iso9660: sector reload failed at block {}", lba);
            self.cached_lba = None;
            return false;
        }
        self.cached_lba = Some(lba);
        true
    }
}

impl<'d, D: SectorDevice> File for DiscFile<'d, D> {
    fn read(&mut self, output: &mut [u8]) -> usize {
        // Requests past end of file are clamped, not failed.
        let want = (output.len() as u64).min(self.size - self.offset) as usize;
        let alignment = self.dev.dma_alignment();

        let mut done = 0;
        while done < want {
            let lba = self.start_lba + (self.offset / SECTOR_SIZE as u64) as u32;
            let within = (self.offset % SECTOR_SIZE as u64) as usize;
            let chunk = want - done;
            let dst = &mut output[done..];

            if within == 0
                && chunk >= SECTOR_SIZE
                && dst.as_ptr() as usize % alignment == 0
            {
                // direct transfer into the caller's buffer
                let bytes = (chunk / SECTOR_SIZE) * SECTOR_SIZE;
                if self.dev.read_sectors(lba, &mut dst[..bytes]).is_err() {
                    log::warn!("iso9660: transfer failed at block {}", lba);
                    break;
                }
                done += bytes;
                self.offset += bytes as u64;
            } else {
                if !self.load_cached(lba) {
                    break;
                }
                let count = (SECTOR_SIZE - within).min(chunk);
                dst[..count].copy_from_slice(&self.cache.0[within..within + count]);
                done += count;
                self.offset += count as u64;
            }
        }
        done
    }

    fn seek(&mut self, offset: u64) -> u64 {
        self.offset = offset.min(self.size);
        self.offset
    }

    fn tell(&self) -> u64 {
        self.offset
    }

    fn size(&self) -> u64 {
        self.size
    }

    // close() keeps the trait default: no exclusive resource to release.
}
