//! Command/interrupt state machine.
//!
//! At most one command and one transfer are ever in flight. Issuing a
//! command arms all five waiting flags; each interrupt phase clears its own
//! flag, and blocking callers spin on the flag for the phase they need:
//!
//! ```text
//! Idle → CommandIssued → Acknowledged → Streaming → Paused/Complete → Idle
//!                └──────────── Error ────────────┘
//! ```
//!
//! `Error` is reachable from every waiting state and is terminal for the
//! in-flight operation. A wait that observes the error flag aborts instead
//! of spinning; when the specific flag and the error flag clear in the same
//! window, error wins.
//!
//! Interrupt handlers publish their mutations (transfer pointer, remaining
//! count, status byte) with a release fence before clearing their waiting
//! flag, so a polling thread never observes a flag clear ahead of the data
//! it guards.

use core::sync::atomic::{fence, AtomicBool, AtomicPtr, AtomicU8, AtomicUsize, Ordering};

use storage::{SectorDevice, StorageError, SECTOR_SIZE};

use crate::error::CdError;
use crate::msf::Msf;
use crate::port::CdPort;
use crate::reg::{cmd, int, mode};
use crate::wait;

/// Response FIFO depth.
const RESPONSE_CAPACITY: usize = 16;

/// Per-phase waiting flags, armed together on command issue and cleared
/// independently, each by its own interrupt handler.
struct WaitFlags {
    data_ready: AtomicBool,
    complete: AtomicBool,
    acknowledge: AtomicBool,
    data_end: AtomicBool,
    error: AtomicBool,
}

impl WaitFlags {
    const fn new() -> Self {
        Self {
            data_ready: AtomicBool::new(false),
            complete: AtomicBool::new(false),
            acknowledge: AtomicBool::new(false),
            data_end: AtomicBool::new(false),
            error: AtomicBool::new(false),
        }
    }

    fn arm_all(&self) {
        self.data_ready.store(true, Ordering::Release);
        self.complete.store(true, Ordering::Release);
        self.acknowledge.store(true, Ordering::Release);
        self.data_end.store(true, Ordering::Release);
        self.error.store(true, Ordering::Release);
    }
}

/// Active transfer descriptor: destination cursor and remaining sector
/// count, advanced by the data-ready handler.
struct Transfer {
    dst: AtomicPtr<u8>,
    remaining: AtomicUsize,
    sector_size: AtomicUsize,
}

struct Response {
    bytes: [u8; RESPONSE_CAPACITY],
    len: usize,
}

/// The controller driver.
///
/// Constructed once and passed by reference into the filesystem and every
/// file handle; all methods take `&self` so the same instance is usable
/// from normal execution and from the interrupt vector.
pub struct CdDriver<P: CdPort> {
    port: P,
    waiting: WaitFlags,
    stream_done: AtomicBool,
    last_status: AtomicU8,
    response: spin::Mutex<Response>,
    transfer: Transfer,
}

impl<P: CdPort> CdDriver<P> {
    /// Bring up the controller and return the driver.
    pub fn new(port: P) -> Self {
        port.reset();
        log::debug!("cdrom: controller reset");
        Self {
            port,
            waiting: WaitFlags::new(),
            stream_done: AtomicBool::new(false),
            last_status: AtomicU8::new(0),
            response: spin::Mutex::new(Response {
                bytes: [0; RESPONSE_CAPACITY],
                len: 0,
            }),
            transfer: Transfer {
                dst: AtomicPtr::new(core::ptr::null_mut()),
                remaining: AtomicUsize::new(0),
                sector_size: AtomicUsize::new(SECTOR_SIZE),
            },
        }
    }

    /// Issue a command with its argument bytes.
    ///
    /// Arms all five waiting flags and clears the stream-complete result
    /// flag before the opcode write, so no interrupt can be missed. Must
    /// not be called while a previous command is still unacknowledged;
    /// the wait helpers enforce that for every internal caller.
    pub fn issue_command(&self, opcode: u8, args: &[u8]) {
        self.waiting.arm_all();
        self.stream_done.store(false, Ordering::Release);

        wait::spin_while(|| self.port.busy());

        self.port.clear_parameter_buffer();
        for &byte in args {
            self.port.write_parameter(byte);
        }
        self.port.write_command(opcode);
    }

    /// Begin a streaming read of `sector_count` sectors at `lba`.
    ///
    /// Issues mode-select, seek-target and streaming-read, waiting for
    /// acknowledge after each; a wait that observes the error flag instead
    /// returns failure. With `blocking`, also spins until the first sector
    /// has been transferred.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writes of `sector_count * SECTOR_SIZE` bytes,
    /// satisfy the DMA alignment, and stay valid until the transfer drains
    /// to pause/complete; there is no cancellation.
    pub unsafe fn start_read(
        &self,
        lba: u32,
        dst: *mut u8,
        sector_count: usize,
        double_speed: bool,
        blocking: bool,
    ) -> Result<(), CdError> {
        self.transfer.dst.store(dst, Ordering::Release);
        self.transfer.sector_size.store(SECTOR_SIZE, Ordering::Release);
        self.transfer.remaining.store(sector_count, Ordering::Release);

        let mode = if double_speed { mode::SPEED_2X } else { 0 };
        self.issue_command(cmd::SETMODE, &[mode]);
        self.wait_acknowledge()?;

        self.issue_command(cmd::SETLOC, &Msf::from_lba(lba).as_bytes());
        self.wait_acknowledge()?;

        self.issue_command(cmd::READ_N, &[]);
        self.wait_acknowledge()?;

        if blocking {
            self.wait_data_ready()?;
        }
        Ok(())
    }

    /// Read whole sectors at `lba` into `dst`, blocking until every sector
    /// has been transferred and the stream has drained to pause.
    pub fn read_sectors_at(
        &self,
        lba: u32,
        dst: &mut [u8],
        double_speed: bool,
    ) -> Result<(), CdError> {
        debug_assert!(dst.len() % SECTOR_SIZE == 0);
        let count = dst.len() / SECTOR_SIZE;
        if count == 0 {
            // nothing to stream; a zero-sector read would never pause
            return Ok(());
        }

        // The borrow on dst outlives the blocking waits below, so the
        // handler's writes through the stored pointer stay in bounds.
        unsafe { self.start_read(lba, dst.as_mut_ptr(), count, double_speed, true)? };

        wait::spin_while(|| {
            self.transfer.remaining.load(Ordering::Acquire) > 0
                && self.waiting.error.load(Ordering::Acquire)
        });
        if !self.waiting.error.load(Ordering::Acquire) {
            return Err(CdError::CommandFailed);
        }

        // Drain the pause issued by the data-ready handler; a new command
        // before its acknowledge would be undefined.
        self.wait_complete()
    }

    /// Access the underlying port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Drive status byte captured by the most recent acknowledge.
    pub fn last_status(&self) -> u8 {
        self.last_status.load(Ordering::Acquire)
    }

    /// Whether the in-flight operation has reached its complete interrupt.
    pub fn stream_complete(&self) -> bool {
        self.stream_done.load(Ordering::Acquire)
    }

    /// Sectors still outstanding on the active transfer.
    pub fn transfer_remaining(&self) -> usize {
        self.transfer.remaining.load(Ordering::Acquire)
    }

    fn wait_acknowledge(&self) -> Result<(), CdError> {
        wait::spin_while(|| {
            self.waiting.acknowledge.load(Ordering::Acquire)
                && self.waiting.error.load(Ordering::Acquire)
        });
        if !self.waiting.error.load(Ordering::Acquire) {
            return Err(CdError::CommandFailed);
        }
        Ok(())
    }

    fn wait_data_ready(&self) -> Result<(), CdError> {
        wait::spin_while(|| {
            self.waiting.data_ready.load(Ordering::Acquire)
                && self.waiting.error.load(Ordering::Acquire)
        });
        if !self.waiting.error.load(Ordering::Acquire) {
            return Err(CdError::CommandFailed);
        }
        Ok(())
    }

    fn wait_complete(&self) -> Result<(), CdError> {
        wait::spin_while(|| {
            self.waiting.complete.load(Ordering::Acquire)
                && self.waiting.error.load(Ordering::Acquire)
        });
        if !self.waiting.error.load(Ordering::Acquire) {
            return Err(CdError::CommandFailed);
        }
        Ok(())
    }

    /// Interrupt entry point, invoked from the interrupt vector.
    ///
    /// Queries the pending interrupt kind, requests the staged sector on
    /// data-ready, acknowledges the controller lines, drains the response
    /// FIFO, then dispatches to the per-phase handler.
    pub fn handle_interrupt(&self) {
        let kind = self.port.pending_interrupt();
        if kind == 0 {
            return;
        }

        if kind == int::DATA_READY {
            self.port.request_sector();
        }
        self.port.acknowledge_interrupts();

        {
            let mut response = self.response.lock();
            response.len = self.port.read_response(&mut response.bytes);
        }

        match kind {
            int::DATA_READY => self.irq_data_ready(),
            int::COMPLETE => self.irq_complete(),
            int::ACKNOWLEDGE => self.irq_acknowledge(),
            int::DATA_END => self.irq_data_end(),
            int::ERROR => self.irq_error(),
            _ => log::warn!("cdrom: unknown interrupt kind {}", kind),
        }
    }

    fn irq_data_ready(&self) {
        let remaining = self.transfer.remaining.load(Ordering::Acquire);
        if remaining == 0 {
            // Read-ahead can stage one more sector than requested before the
            // pause lands; it has nowhere to go.
            log::warn!("cdrom: data-ready with no transfer outstanding");
            fence(Ordering::Release);
            self.waiting.data_ready.store(false, Ordering::Release);
            return;
        }

        let dst = self.transfer.dst.load(Ordering::Acquire);
        let size = self.transfer.sector_size.load(Ordering::Acquire);
        unsafe {
            self.port.dma_sector(dst, size);
            self.transfer.dst.store(dst.add(size), Ordering::Release);
        }
        self.transfer.remaining.store(remaining - 1, Ordering::Release);

        if remaining == 1 {
            self.issue_command(cmd::PAUSE, &[]);
        }

        // Publish pointer/counter updates before the flag clear is visible.
        fence(Ordering::Release);
        self.waiting.data_ready.store(false, Ordering::Release);
    }

    fn irq_complete(&self) {
        self.stream_done.store(true, Ordering::Release);
        fence(Ordering::Release);
        self.waiting.complete.store(false, Ordering::Release);
    }

    fn irq_acknowledge(&self) {
        let status = {
            let response = self.response.lock();
            if response.len > 0 {
                response.bytes[0]
            } else {
                0
            }
        };
        self.last_status.store(status, Ordering::Release);
        fence(Ordering::Release);
        self.waiting.acknowledge.store(false, Ordering::Release);
    }

    fn irq_data_end(&self) {
        fence(Ordering::Release);
        self.waiting.data_end.store(false, Ordering::Release);
    }

    fn irq_error(&self) {
        {
            let response = self.response.lock();
            log::warn!(
                "cdrom: error interrupt, status={:#04x}",
                if response.len > 0 { response.bytes[0] } else { 0 }
            );
        }
        fence(Ordering::Release);
        self.waiting.error.store(false, Ordering::Release);
    }
}

impl<P: CdPort> SectorDevice for CdDriver<P> {
    fn dma_alignment(&self) -> usize {
        4
    }

    fn read_sectors(&self, lba: u32, dst: &mut [u8]) -> storage::Result<()> {
        self.read_sectors_at(lba, dst, true)
            .map_err(StorageError::from)
    }
}
