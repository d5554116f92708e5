//! execute mode
//!
//! `--flash` wins over `--address` when both are given; a warning is
//! printed rather than silently picking one. Neither EXECUTE_MEM nor
//! EXECUTE_FLASH waits for a response: the board jumps away and may never
//! reply.

use super::{OrchestratorCtx, RunOptions};
use crate::endian::uint_to_le_bytes;
use crate::error::Error;
use crate::framer::ProtocolCommand;
use crate::serial::Transport;

pub fn run<T: Transport>(ctx: &mut OrchestratorCtx<T>, opts: &RunOptions) -> Result<(), Error> {
    if opts.flash {
        if opts.address.is_some() {
            eprintln!("warning: --flash and --address both given; executing from flash");
        }
        println!("Executing program at address 0x00 in flash");
        ctx.framer.send_command(ProtocolCommand::ExecuteFlash)?;
        return Ok(());
    }

    let address = opts.address.ok_or(Error::MissingArgument("--address"))?;
    println!("Executing program at address 0x{address:06X} in memory");
    let payload = uint_to_le_bytes(address as u64, 3);
    ctx.framer
        .send_command_with_payload(ProtocolCommand::ExecuteMem, &payload)?;
    Ok(())
}
