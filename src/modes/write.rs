//! write mode
//!
//! RAM mode sends each block of the parsed image via WRITE_MEM in order;
//! `--flash` delegates to [`super::flash_write`] entirely.

use super::{flash_write, OrchestratorCtx, RunOptions};
use crate::endian::uint_to_le_bytes;
use crate::error::Error;
use crate::framer::{CommandResponse, ProtocolCommand};
use crate::serial::Transport;

pub fn run<T: Transport>(ctx: &mut OrchestratorCtx<T>, opts: &RunOptions) -> Result<(), Error> {
    if opts.flash {
        return flash_write::run(ctx, opts);
    }

    let image = opts.image.as_ref().ok_or(Error::MissingArgument("FILENAME"))?;

    for block in &image.blocks {
        let mut payload = uint_to_le_bytes(block.address as u64, 3);
        payload.extend(uint_to_le_bytes(block.length() as u64, 3));
        payload.extend_from_slice(&block.data);

        let status = match ctx
            .framer
            .send_command_with_payload(ProtocolCommand::WriteMem, &payload)?
        {
            CommandResponse::Status(status) => status,
            _ => return Err(Error::ReadFailed),
        };
        if status != 0x00 {
            return Err(Error::WriteFailed(status));
        }
    }

    if opts.execute_after {
        let entry = image.entry.unwrap_or(0);
        let payload = uint_to_le_bytes(entry as u64, 3);
        ctx.framer
            .send_command_with_payload(ProtocolCommand::ExecuteMem, &payload)?;
    }

    Ok(())
}
