//! Bounds-checked reader over on-disc byte buffers.
//!
//! Every on-disc structure is decoded field by field through this cursor;
//! nothing overlays a struct on raw bytes. Dual-endian fields trust only
//! the little-endian half; the big-endian copy is never authoritative.

/// Sequential reader with an explicit position.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Advance without reading.
    pub fn skip(&mut self, count: usize) -> Option<()> {
        if self.remaining() < count {
            return None;
        }
        self.pos += count;
        Some(())
    }

    /// Read `count` bytes.
    pub fn bytes(&mut self, count: usize) -> Option<&'a [u8]> {
        if self.remaining() < count {
            return None;
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Some(slice)
    }

    /// Read a fixed-size byte array.
    pub fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Some(out)
    }

    /// Read one byte.
    pub fn u8(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    /// Read a little-endian 32-bit value.
    pub fn le_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.array::<4>()?))
    }

    /// Read a dual-encoded 16-bit value (2 bytes LE, 2 bytes BE); the
    /// little-endian half is the value.
    pub fn both_u16(&mut self) -> Option<u16> {
        let value = u16::from_le_bytes(self.array::<2>()?);
        self.skip(2)?;
        Some(value)
    }

    /// Read a dual-encoded 32-bit value (4 bytes LE, 4 bytes BE).
    pub fn both_u32(&mut self) -> Option<u32> {
        let value = u32::from_le_bytes(self.array::<4>()?);
        self.skip(4)?;
        Some(value)
    }
}
