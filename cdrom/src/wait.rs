//! Busy-wait helpers.
//!
//! There is no scheduler: forward progress for a blocking operation is a
//! poll loop spinning on flags that only interrupt handlers clear. Disc
//! waits are unbounded (the hardware eventually completes or raises the
//! error interrupt); the bounded variant exists for waits with an external
//! deadline, such as the display-refresh wait.

use crate::error::CdError;

/// Spin while `cond` holds.
pub fn spin_while(mut cond: impl FnMut() -> bool) {
    while cond() {
        core::hint::spin_loop();
    }
}

/// Spin while `cond` holds, giving up after `limit` iterations.
pub fn spin_while_bounded(limit: u32, mut cond: impl FnMut() -> bool) -> Result<(), CdError> {
    for _ in 0..limit {
        if !cond() {
            return Ok(());
        }
        core::hint::spin_loop();
    }
    Err(CdError::Timeout)
}
