//! write --flash
//!
//! Consumes the raw, uncoalesced Z-record stream directly rather than the
//! `ProgramImage`. The shadow-buffer truncation point is taken from the
//! *last* record processed, not a true running maximum: out-of-order
//! records in the flash window will truncate incorrectly. That is left
//! as-is rather than silently fixed; see `DESIGN.md`.

use super::{OrchestratorCtx, RunOptions};
use crate::endian::uint_to_le_bytes;
use crate::error::Error;
use crate::framer::{CommandResponse, ProtocolCommand};
use crate::serial::Transport;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn wait_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

const FLASH_WINDOW_BASE: u32 = 0x8000;
const FLASH_WINDOW_LEN: usize = 32768;

pub fn run<T: Transport>(ctx: &mut OrchestratorCtx<T>, opts: &RunOptions) -> Result<(), Error> {
    let (_, records) = opts
        .zrecord
        .as_ref()
        .ok_or(Error::MissingArgument("FILENAME (Z-record image)"))?;

    if records.first().map(|r| r.address) != Some(FLASH_WINDOW_BASE) {
        return Err(Error::InvalidFlashImage(
            "first record does not start at 0x8000",
        ));
    }

    let mut shadow = vec![0u8; FLASH_WINDOW_LEN];
    let mut last_address = 0u32;
    let mut last_len = 0usize;

    for record in records {
        if record.address < FLASH_WINDOW_BASE {
            break;
        }
        let offset = (record.address - FLASH_WINDOW_BASE) as usize;
        if offset + record.length() > shadow.len() {
            return Err(Error::InvalidFlashImage("record exceeds the 32KiB flash window"));
        }
        shadow[offset..offset + record.length()].copy_from_slice(&record.data);
        last_address = record.address;
        last_len = record.length();
    }

    let truncated_len = (last_address - FLASH_WINDOW_BASE) as usize + last_len;
    shadow.truncate(truncated_len);

    println!("Clearing flash...");
    let clear_status = match ctx.framer.send_command(ProtocolCommand::ClearFlash)? {
        CommandResponse::Status(status) => status,
        _ => return Err(Error::ReadFailed),
    };
    if clear_status != 0x00 {
        return Err(Error::WriteFailed(clear_status));
    }
    println!("Cleared successfully");

    println!("Writing contents to flash...");
    let mut payload = uint_to_le_bytes(FLASH_WINDOW_BASE as u64, 3);
    payload.extend(uint_to_le_bytes(shadow.len() as u64, 3));
    payload.extend_from_slice(&shadow);

    let spinner = wait_spinner("Writing to flash...");
    match ctx
        .framer
        .send_command_with_payload(ProtocolCommand::WriteFlash, &payload)?
    {
        CommandResponse::Status(_) => {}
        _ => return Err(Error::ReadFailed),
    };
    std::thread::sleep(Duration::from_secs(2));
    let write_status = ctx.framer.read_status()?;
    spinner.finish_and_clear();
    if write_status != 0x00 {
        return Err(Error::WriteFailed(write_status));
    }
    println!("Written successfully");

    if opts.execute_after {
        println!("Executing program at address 0x00 in flash");
        ctx.framer.send_command(ProtocolCommand::ExecuteFlash)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::DataBlock;

    #[test]
    fn rejects_image_not_starting_at_flash_base() {
        let records = vec![DataBlock::new(0x9000, vec![0xAA])];
        assert!(records.first().map(|r| r.address) != Some(FLASH_WINDOW_BASE));
    }

    #[test]
    fn truncation_uses_last_record_not_true_maximum() {
        // Out-of-order: the second record has a lower address than the
        // first, but truncation still follows the *last* record processed.
        let records = vec![
            DataBlock::new(0x8000, vec![0xAA; 100]),
            DataBlock::new(0x8010, vec![0xBB; 4]),
        ];
        let mut last_address = 0u32;
        let mut last_len = 0usize;
        for record in &records {
            last_address = record.address;
            last_len = record.length();
        }
        let truncated_len = (last_address - FLASH_WINDOW_BASE) as usize + last_len;
        // Had this tracked a true maximum, it would be 100, not 20.
        assert_eq!(truncated_len, 0x10 + 4);
    }
}
