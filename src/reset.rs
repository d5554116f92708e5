//! Reset / manual sync
//!
//! The board reset sequence is a DTR low/high/low pulse with 300 ms holds
//! between transitions; some USB-serial bridges invert DTR, but this is
//! specified at the logical level. Manual sync is a plain delay before the
//! first `SYNC` command, used when a board needs extra settling time after
//! power-up.

use crate::serial::SerialChannel;
use std::time::Duration;

/// Hold between each DTR transition in the reset pulse.
const RESET_HOLD: Duration = Duration::from_millis(300);

/// Default `--sync` delay, in seconds, when none is given.
pub const DEFAULT_SYNC_SECONDS: u64 = 4;

/// Pulse DTR low/high/low unless the caller has asked to skip it
/// (`--no-reset`).
pub fn reset_pulse(channel: &mut SerialChannel, skip: bool) -> Result<(), crate::error::Error> {
    if skip {
        log::debug!("skipping reset pulse (--no-reset)");
        return Ok(());
    }
    log::debug!("pulsing DTR for board reset");
    channel.pulse_dtr(RESET_HOLD)
}

/// Sleep for `seconds` before the caller proceeds with SYNC, printing the
/// same kind of prompt an interactive bootloader session would show.
pub fn manual_sync_delay(seconds: u64) {
    println!("Pausing {seconds}s before SYNC, reset the board now if needed...");
    std::thread::sleep(Duration::from_secs(seconds));
}
