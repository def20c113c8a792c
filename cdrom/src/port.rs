//! Hardware access boundary for the controller.
//!
//! The command/interrupt state machine in [`crate::driver`] is written
//! against this trait so it can run against the real memory-mapped
//! controller on target and against a simulated controller in tests.

use crate::reg;

/// Byte-level access to the controller and its DMA channel.
///
/// All methods take `&self`: the same port is touched from normal execution
/// and from interrupt context, and implementations are expected to be no
/// more than thin register accessors.
pub trait CdPort {
    /// Bring the controller to a known state: configure the bus slot,
    /// enable the DMA channel, acknowledge and unmask all interrupt lines,
    /// and route the audio channels through.
    fn reset(&self);

    /// Whether the controller's busy line is asserted (command in flight).
    fn busy(&self) -> bool;

    /// Flush the parameter FIFO.
    fn clear_parameter_buffer(&self);

    /// Push one argument byte into the parameter FIFO.
    fn write_parameter(&self, byte: u8);

    /// Write the opcode register, starting command execution.
    fn write_command(&self, opcode: u8);

    /// Pending interrupt kind (one of [`reg::int`]), or 0 if none.
    fn pending_interrupt(&self) -> u8;

    /// Acknowledge all controller interrupt lines and flush the parameter
    /// FIFO.
    fn acknowledge_interrupts(&self);

    /// Request the staged sector buffer so it becomes visible to DMA.
    fn request_sector(&self);

    /// Drain the response FIFO into `dst`, returning the byte count.
    fn read_response(&self, dst: &mut [u8]) -> usize;

    /// Transfer one staged sector to `dst` over the DMA channel, blocking
    /// until the block transfer finishes.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writes of `len` bytes and satisfy the
    /// channel's alignment requirement.
    unsafe fn dma_sector(&self, dst: *mut u8, len: usize);
}

/// The memory-mapped controller.
pub struct MmioPort {
    _private: (),
}

impl MmioPort {
    /// # Safety
    ///
    /// There must be at most one `MmioPort` in the process, and the
    /// controller's register block must be mapped at its fixed addresses.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }

    fn select_bank(&self, bank: u8) {
        unsafe { write8(reg::CDROM_ADDRESS, bank) }
    }

    /// Register writes need a few cycles to settle before the next access.
    fn settle(&self) {
        for _ in 0..64 {
            core::hint::spin_loop();
        }
    }
}

impl CdPort for MmioPort {
    fn reset(&self) {
        unsafe {
            write32(reg::BIU_DEV5_CTRL, reg::BIU_DEV5_CONFIG);
            write32(reg::DMA_DPCR, read32(reg::DMA_DPCR) | reg::DMA_DPCR_CH3_ENABLE);
        }

        self.select_bank(1);
        unsafe {
            write8(reg::CDROM_REQUEST, reg::hclrctl::CLRINT_ALL);
            write8(reg::CDROM_PARAMETER, reg::hclrctl::CLRINT_ALL); // unmask all lines
        }

        self.select_bank(0);
        unsafe { write8(reg::CDROM_REQUEST, 0) } // clear pending requests

        self.select_bank(2);
        unsafe {
            write8(reg::CDROM_PARAMETER, reg::audio::ATV0_FULL);
            write8(reg::CDROM_REQUEST, 0);
        }
        self.select_bank(3);
        unsafe {
            write8(reg::CDROM_COMMAND, reg::audio::ATV2_FULL);
            write8(reg::CDROM_PARAMETER, 0);
            write8(reg::CDROM_REQUEST, reg::audio::ADPCTL_CHNGATV);
        }
    }

    fn busy(&self) -> bool {
        unsafe { read8(reg::CDROM_ADDRESS) & reg::hsts::BUSYSTS != 0 }
    }

    fn clear_parameter_buffer(&self) {
        self.select_bank(1);
        unsafe { write8(reg::CDROM_REQUEST, reg::hclrctl::CLRPRM) }
        self.settle();
    }

    fn write_parameter(&self, byte: u8) {
        self.select_bank(0);
        unsafe { write8(reg::CDROM_PARAMETER, byte) }
    }

    fn write_command(&self, opcode: u8) {
        self.select_bank(0);
        unsafe { write8(reg::CDROM_COMMAND, opcode) }
    }

    fn pending_interrupt(&self) -> u8 {
        self.select_bank(1);
        unsafe { read8(reg::CDROM_REQUEST) & 0x07 }
    }

    fn acknowledge_interrupts(&self) {
        self.select_bank(1);
        unsafe {
            write8(reg::CDROM_REQUEST, reg::hclrctl::CLRINT_ALL);
            write8(reg::CDROM_REQUEST, reg::hclrctl::CLRPRM);
        }
        self.settle();
    }

    fn request_sector(&self) {
        self.select_bank(0);
        unsafe {
            write8(reg::CDROM_REQUEST, 0);
            write8(reg::CDROM_REQUEST, reg::hchpctl::BFRD);
        }
    }

    fn read_response(&self, dst: &mut [u8]) -> usize {
        self.select_bank(1);
        let mut count = 0;
        unsafe {
            while count < dst.len() && read8(reg::CDROM_ADDRESS) & reg::hsts::RSLRRDY != 0 {
                dst[count] = read8(reg::CDROM_COMMAND);
                count += 1;
            }
        }
        count
    }

    unsafe fn dma_sector(&self, dst: *mut u8, len: usize) {
        write32(reg::DMA3_MADR, dst as usize as u32);
        write32(reg::DMA3_BCR, (len as u32 / 4) | 0x0001_0000);
        write32(reg::DMA3_CHCR, reg::DMA_CHCR_START);
        while read32(reg::DMA3_CHCR) & reg::DMA_CHCR_BUSY != 0 {
            core::hint::spin_loop();
        }
    }
}

unsafe fn write8(addr: usize, value: u8) {
    core::ptr::write_volatile(addr as *mut u8, value);
}

unsafe fn read8(addr: usize) -> u8 {
    core::ptr::read_volatile(addr as *const u8)
}

unsafe fn write32(addr: usize, value: u32) {
    core::ptr::write_volatile(addr as *mut u32, value);
}

unsafe fn read32(addr: usize) -> u32 {
    core::ptr::read_volatile(addr as *const u32)
}
