//! Simulated controller for driver tests.
//!
//! Models the hardware's interrupt sequencing: every command is
//! acknowledged, a streaming read stages one sector per data-ready, and a
//! pause acknowledges then completes. Interrupts are delivered by a pump
//! thread standing in for the interrupt vector.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use cdrom::reg::{cmd, int};
use cdrom::{CdDriver, CdPort, Msf};

pub const SECTOR_SIZE: usize = 2048;

/// Drive status byte reported in every response (motor on).
const STATUS_MOTOR_ON: u8 = 0x02;

#[derive(Default)]
pub struct SimState {
    /// Disc image, 2048 bytes per sector.
    pub image: Vec<u8>,
    /// Parameter FIFO.
    params: Vec<u8>,
    /// Interrupts waiting for the pump thread.
    pub pending: VecDeque<u8>,
    /// Interrupt currently presented to the driver.
    current: u8,
    /// Next LBA the read head will stage.
    position: u32,
    /// Sector staged for DMA readout.
    staged: Option<u32>,
    /// Streaming read in progress.
    reading: bool,
    /// Last mode byte accepted.
    pub mode: u8,
    /// Dispatch order, for interrupt-sequencing assertions.
    pub dispatched: Vec<u8>,
    /// Fail the streaming read issued at this LBA.
    pub fail_read_at: Option<u32>,
}

pub struct SimPort {
    pub state: Mutex<SimState>,
}

impl SimPort {
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            state: Mutex::new(SimState {
                image,
                ..SimState::default()
            }),
        }
    }

    /// Build an image of `sectors` sectors where each byte encodes its
    /// sector and offset, so misdirected DMA shows up as a mismatch.
    pub fn patterned_image(sectors: usize) -> Vec<u8> {
        let mut image = vec![0u8; sectors * SECTOR_SIZE];
        for (index, byte) in image.iter_mut().enumerate() {
            *byte = ((index / SECTOR_SIZE) as u8) ^ (index % 251) as u8;
        }
        image
    }
}

impl CdPort for SimPort {
    fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        state.params.clear();
        state.pending.clear();
        state.current = 0;
        state.reading = false;
        state.staged = None;
    }

    fn busy(&self) -> bool {
        false
    }

    fn clear_parameter_buffer(&self) {
        self.state.lock().unwrap().params.clear();
    }

    fn write_parameter(&self, byte: u8) {
        self.state.lock().unwrap().params.push(byte);
    }

    fn write_command(&self, opcode: u8) {
        let mut state = self.state.lock().unwrap();
        match opcode {
            cmd::SETMODE => {
                state.mode = state.params.first().copied().unwrap_or(0);
                state.pending.push_back(int::ACKNOWLEDGE);
            }
            cmd::SETLOC => {
                let msf = Msf {
                    minute: state.params[0],
                    second: state.params[1],
                    frame: state.params[2],
                };
                state.position = msf.to_lba();
                state.pending.push_back(int::ACKNOWLEDGE);
            }
            cmd::READ_N => {
                state.pending.push_back(int::ACKNOWLEDGE);
                if state.fail_read_at == Some(state.position) {
                    state.pending.push_back(int::ERROR);
                } else {
                    state.reading = true;
                }
            }
            cmd::PAUSE => {
                state.reading = false;
                state.pending.push_back(int::ACKNOWLEDGE);
                state.pending.push_back(int::COMPLETE);
            }
            _ => panic!("unexpected opcode {opcode:#04x}"),
        }
        state.params.clear();
    }

    fn pending_interrupt(&self) -> u8 {
        self.state.lock().unwrap().current
    }

    fn acknowledge_interrupts(&self) {
        self.state.lock().unwrap().current = 0;
    }

    fn request_sector(&self) {
        let mut state = self.state.lock().unwrap();
        let lba = state.position;
        state.staged = Some(lba);
        state.position += 1;
    }

    fn read_response(&self, dst: &mut [u8]) -> usize {
        dst[0] = STATUS_MOTOR_ON;
        1
    }

    unsafe fn dma_sector(&self, dst: *mut u8, len: usize) {
        let state = self.state.lock().unwrap();
        let lba = state.staged.expect("DMA with no staged sector") as usize;
        let src = &state.image[lba * SECTOR_SIZE..lba * SECTOR_SIZE + len];
        std::ptr::copy_nonoverlapping(src.as_ptr(), dst, len);
    }
}

/// Deliver the next pending interrupt, if any, and return its kind.
pub fn pump(driver: &CdDriver<SimPort>) -> Option<u8> {
    let kind = {
        let mut state = driver.port().state.lock().unwrap();
        let kind = state.pending.pop_front()?;
        state.current = kind;
        kind
    };
    driver.handle_interrupt();

    let mut state = driver.port().state.lock().unwrap();
    state.dispatched.push(kind);
    if state.reading && state.pending.is_empty() {
        state.pending.push_back(int::DATA_READY);
    }
    Some(kind)
}

/// Run `body` with a pump thread delivering interrupts, the way the
/// interrupt vector would on target.
pub fn with_pump<T: Send>(driver: &CdDriver<SimPort>, body: impl FnOnce() -> T + Send) -> T {
    let stop = AtomicBool::new(false);
    std::thread::scope(|scope| {
        scope.spawn(|| {
            while !stop.load(Ordering::Relaxed) {
                if pump(driver).is_none() {
                    std::thread::yield_now();
                }
            }
        });
        let result = body();
        stop.store(true, Ordering::Relaxed);
        result
    })
}
