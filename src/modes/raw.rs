//! raw mode
//!
//! Sends a whitespace-separated hex-byte string directly, bypassing the
//! preamble/echo/command-byte framing entirely, then reports whatever
//! comes back.

use super::{OrchestratorCtx, RunOptions};
use crate::error::Error;
use crate::serial::Transport;
use std::time::Duration;

pub fn run<T: Transport>(ctx: &mut OrchestratorCtx<T>, opts: &RunOptions) -> Result<(), Error> {
    let hex_string = opts
        .hex_string
        .as_deref()
        .ok_or(Error::MissingArgument("--hex-string"))?;

    for token in hex_string.split_whitespace() {
        let byte = u8::from_str_radix(token, 16)
            .map_err(|_| Error::InvalidAddress(token.to_string()))?;
        ctx.framer.write_raw(&[byte])?;
    }

    std::thread::sleep(Duration::from_secs(1));
    let response = ctx.framer.read_until_idle()?;
    println!(
        "{}",
        response
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    );
    Ok(())
}
