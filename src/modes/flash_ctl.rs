//! clear / check

use super::OrchestratorCtx;
use crate::error::Error;
use crate::framer::{CommandResponse, ProtocolCommand};
use crate::serial::Transport;

fn status_only<T: Transport>(
    ctx: &mut OrchestratorCtx<T>,
    cmd: ProtocolCommand,
) -> Result<u8, Error> {
    match ctx.framer.send_command(cmd)? {
        CommandResponse::Status(status) => Ok(status),
        _ => Err(Error::ReadFailed),
    }
}

pub fn clear<T: Transport>(ctx: &mut OrchestratorCtx<T>) -> Result<(), Error> {
    println!("Clearing flash...");
    let status = status_only(ctx, ProtocolCommand::ClearFlash)?;
    if status == 0x00 {
        println!("Cleared successfully");
        Ok(())
    } else {
        Err(Error::WriteFailed(status))
    }
}

pub fn check<T: Transport>(ctx: &mut OrchestratorCtx<T>) -> Result<(), Error> {
    println!("Checking flash...");
    let status = status_only(ctx, ProtocolCommand::CheckFlash)?;
    if status == 0x00 {
        println!("Check successful");
        Ok(())
    } else {
        Err(Error::WriteFailed(status))
    }
}
