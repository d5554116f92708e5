//! Manual sync
//!
//! Reached via `-s/--sync [N]`, not a `-m/--mode` value: it runs once after
//! the reset pulse and before the `BOARD_INFO` probe, not as a dispatched
//! mode. See `DESIGN.md`.

use super::OrchestratorCtx;
use crate::error::Error;
use crate::framer::ProtocolCommand;
use crate::reset::manual_sync_delay;
use crate::serial::Transport;

pub fn run<T: Transport>(ctx: &mut OrchestratorCtx<T>, seconds: u64) -> Result<(), Error> {
    manual_sync_delay(seconds);
    println!("Syncing...");
    let status = ctx.framer.send_command(ProtocolCommand::Sync)?;
    if let crate::framer::CommandResponse::Status(0x00) = status {
        println!("Synced successfully");
    }
    Ok(())
}
