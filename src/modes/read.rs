//! read mode
//!
//! RAM mode requires `--address` and `--length`; flash mode always starts
//! at `0x000000` and only requires `--length`. The response is printed as
//! an address-prefixed hex dump, 16 bytes per row.

use super::{OrchestratorCtx, RunOptions};
use crate::endian::uint_to_le_bytes;
use crate::error::Error;
use crate::framer::{CommandResponse, ProtocolCommand};
use crate::serial::Transport;

pub fn run<T: Transport>(ctx: &mut OrchestratorCtx<T>, opts: &RunOptions) -> Result<(), Error> {
    let length = opts.length.filter(|&l| l >= 1).ok_or(Error::MissingArgument("--length"))?;

    let (cmd, start_address) = if opts.flash {
        println!("Reading from flash...\nStarting at address 0x0000");
        (ProtocolCommand::ReadFlash, 0u32)
    } else {
        let address = opts.address.ok_or(Error::MissingArgument("--address"))?;
        println!("Reading from memory...");
        (ProtocolCommand::ReadMem, address)
    };

    let mut payload = uint_to_le_bytes(start_address as u64, 3);
    payload.extend(uint_to_le_bytes(length as u64, 3));

    let response = match ctx.framer.send_command_with_payload(cmd, &payload)? {
        CommandResponse::Data(data) => data,
        _ => return Err(Error::ReadFailed),
    };

    for row in hex_dump_rows(start_address, &response) {
        println!("{row}");
    }
    Ok(())
}

fn hex_dump_rows(start_address: u32, data: &[u8]) -> Vec<String> {
    data.chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let address = start_address + (row * 16) as u32;
            let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02X}")).collect();
            format!("{:06X}:\t{}", address, hex.join(" "))
        })
        .collect()
}
