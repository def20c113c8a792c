//! Sector-granular buffers and size calculations.

use alloc::vec::Vec;
use storage::SECTOR_SIZE;

/// Sectors needed to hold `byte_count` bytes.
pub fn sectors_for_bytes(byte_count: u32) -> u32 {
    byte_count.div_ceil(SECTOR_SIZE as u32)
}

/// Check if a byte offset sits on a sector boundary.
pub fn is_sector_aligned(offset: u64) -> bool {
    offset % SECTOR_SIZE as u64 == 0
}

/// One sector, aligned for direct hardware transfer.
#[derive(Clone)]
#[repr(C, align(4))]
pub struct SectorBuf(pub [u8; SECTOR_SIZE]);

impl SectorBuf {
    /// A zeroed sector.
    pub const fn new() -> Self {
        Self([0; SECTOR_SIZE])
    }
}

impl Default for SectorBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Heap scratch buffer of whole sectors, aligned for direct transfer.
///
/// Used for directory extents; allocated fresh per resolution call and
/// freed on every return path.
pub(crate) struct ExtentBuf {
    sectors: Vec<SectorBuf>,
}

impl ExtentBuf {
    pub fn new(sector_count: usize) -> Self {
        Self {
            sectors: alloc::vec![SectorBuf::new(); sector_count],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SectorBuf is exactly SECTOR_SIZE bytes and its alignment divides
        // its size, so the elements are contiguous.
        unsafe {
            core::slice::from_raw_parts(
                self.sectors.as_ptr().cast::<u8>(),
                self.sectors.len() * SECTOR_SIZE,
            )
        }
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        unsafe {
            core::slice::from_raw_parts_mut(
                self.sectors.as_mut_ptr().cast::<u8>(),
                self.sectors.len() * SECTOR_SIZE,
            )
        }
    }
}
