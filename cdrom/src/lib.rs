//! Interrupt-driven CD-ROM controller driver.
//!
//! Owns the hardware command/interrupt protocol for the engine's disc
//! storage: a single in-flight command, completion signaled only via
//! interrupts, and busy-wait synchronization with no OS primitives.
//!
//! # Architecture
//!
//! The driver is layered:
//! 1. **Port layer** ([`port`]) - raw register access behind the [`CdPort`]
//!    trait, with a memory-mapped implementation for target hardware
//! 2. **Driver layer** ([`driver`]) - the command/interrupt state machine
//! 3. **Addressing** ([`msf`]) - logical block to minute/second/frame
//!    conversion for seek targets
//!
//! # Usage
//!
//! ```ignore
//! use cdrom::{CdDriver, MmioPort};
//!
//! let driver = CdDriver::new(unsafe { MmioPort::new() });
//!
//! // From the interrupt vector:
//! driver.handle_interrupt();
//!
//! // From normal execution:
//! let mut sector = [0u8; 2048];
//! driver.read_sectors_at(16, &mut sector, true)?;
//! ```

#![no_std]
#![warn(missing_docs)]

pub mod driver;
pub mod error;
pub mod msf;
pub mod port;
pub mod reg;
pub mod wait;

pub use driver::CdDriver;
pub use error::CdError;
pub use msf::Msf;
pub use port::{CdPort, MmioPort};
