//! update mode — bootloader self-replacement
//!
//! Builds a 64KiB shadow buffer from the raw Z-record stream, validates
//! the CPU-dependent interrupt vectors and the low-memory region before
//! sending a single byte of the handshake, then drives the multi-phase
//! UPDATE exchange. A single dropped byte between validation and the
//! final confirmation can leave the board bootloader unbootable, so every
//! phase is checked before the next byte goes out.

use super::{OrchestratorCtx, RunOptions};
use crate::board_info::Cpu;
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

const SHADOW_LEN: usize = 0x10000;
const UPDATE_REGION_BASE: u32 = 0xF000;
const UPDATE_REGION_LEN: usize = 0x1000;

pub fn run<T: Transport>(ctx: &mut OrchestratorCtx<T>, opts: &RunOptions) -> Result<(), Error> {
    let (_, records) = opts
        .zrecord
        .as_ref()
        .ok_or(Error::MissingArgument("FILENAME (Z-record image)"))?;

    let cpu = match &ctx.board_info {
        Some(info) => info.cpu,
        None => return Err(Error::UnknownBoard),
    };

    let shadow = build_shadow(records)?;
    validate_vectors(&shadow, cpu)?;
    validate_low_memory(&shadow)?;

    let payload = &shadow[UPDATE_REGION_BASE as usize..];
    if 0xFFFF - payload.len() + 1 != UPDATE_REGION_BASE as usize {
        return Err(Error::InvalidUpdateImage("update region does not start at 0xF000"));
    }

    println!("Writing contents to memory...");

    let cmd_status = match ctx.framer.send_command(ProtocolCommand::Update)? {
        CommandResponse::Status(status) => status,
        _ => return Err(Error::ReadFailed),
    };
    if cmd_status != 0x00 {
        return Err(Error::CannotUpdate(cmd_status));
    }

    ctx.framer.write_raw(&[0x55, 0xAA, 0xCC])?;
    ctx.framer.write_raw(&[0x00, 0xF0, 0x00])?;
    ctx.framer.write_raw(&[0x00, 0x10, 0x00])?;

    let addr_len_status = ctx.framer.read_status()?;
    if addr_len_status != 0x01 {
        return Err(Error::CannotUpdate(addr_len_status));
    }

    ctx.framer.write_raw(payload)?;

    let data_status = ctx.framer.read_status()?;
    if data_status != 0x02 {
        return Err(Error::CannotUpdate(data_status));
    }

    println!("Program data uploaded");
    if !confirm_with_operator()? {
        ctx.framer.write_raw(&[0x00, 0x00, 0x00])?;
        let _ = ctx.framer.read_status()?;
        println!("Update has been cancelled, goodbye");
        return Err(Error::UserAborted);
    }

    ctx.framer.write_raw(&[0x55, 0xAA, 0xCC])?;
    std::thread::sleep(Duration::from_secs(2));
    let final_status = ctx.framer.read_status()?;
    if final_status != 0x03 {
        return Err(Error::BadFlash(final_status));
    }

    println!("Flash was updated successfully");
    Ok(())
}

fn build_shadow(records: &[crate::image::DataBlock]) -> Result<Vec<u8>, Error> {
    let mut shadow = vec![0u8; SHADOW_LEN];
    for record in records {
        let start = record.address as usize;
        let end = start + record.length();
        if end > shadow.len() {
            return Err(Error::InvalidUpdateImage("record exceeds the 64KiB address space"));
        }
        shadow[start..end].copy_from_slice(&record.data);
    }
    Ok(shadow)
}

fn validate_vectors(shadow: &[u8], cpu: Cpu) -> Result<(), Error> {
    let vector_pairs: &[(usize, usize)] = match cpu {
        Cpu::W65C02 => &[(0xFFFA, 0xFFFB), (0xFFFC, 0xFFFD), (0xFFFE, 0xFFFF)],
        Cpu::W65C816 => &[
            (0xFFF4, 0xFFF5),
            (0xFFF6, 0xFFF7),
            (0xFFF8, 0xFFF9),
            (0xFFFA, 0xFFFB),
            (0xFFFC, 0xFFFD),
            (0xFFFE, 0xFFFF),
        ],
        Cpu::Unknown => return Err(Error::UnknownCpu),
    };

    for &(lo, hi) in vector_pairs {
        if shadow[lo] == 0 && shadow[hi] == 0 {
            return Err(Error::InvalidUpdateImage("an interrupt vector is zero"));
        }
    }
    Ok(())
}

fn validate_low_memory(shadow: &[u8]) -> Result<(), Error> {
    if shadow[..UPDATE_REGION_BASE as usize].iter().any(|&b| b != 0) {
        return Err(Error::InvalidUpdateImage(
            "data present below 0xF000, only the update region may be populated",
        ));
    }
    Ok(())
}

fn confirm_with_operator() -> Result<bool, Error> {
    use std::io::Write;
    print!("Do you want to continue Y/n: ");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(Error::StdinReadFailed)?;
    Ok(line.trim() == "Y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::DataBlock;

    fn shadow_with_update_payload(payload: Vec<u8>) -> Vec<u8> {
        let mut shadow = vec![0u8; SHADOW_LEN];
        shadow[UPDATE_REGION_BASE as usize..].copy_from_slice(&payload);
        shadow
    }

    #[test]
    fn rejects_zero_vectors_on_w65c02() {
        let shadow = shadow_with_update_payload(vec![0u8; UPDATE_REGION_LEN]);
        let err = validate_vectors(&shadow, Cpu::W65C02).unwrap_err();
        assert!(matches!(err, Error::InvalidUpdateImage(_)));
    }

    #[test]
    fn accepts_nonzero_vectors() {
        let mut payload = vec![0u8; UPDATE_REGION_LEN];
        // FFFA/FFFB etc relative to the 0xF000 base.
        payload[0x0FFA] = 0x12;
        payload[0x0FFC] = 0x34;
        payload[0x0FFE] = 0x56;
        let shadow = shadow_with_update_payload(payload);
        validate_vectors(&shadow, Cpu::W65C02).unwrap();
    }

    #[test]
    fn rejects_unknown_cpu() {
        let shadow = shadow_with_update_payload(vec![0xFFu8; UPDATE_REGION_LEN]);
        let err = validate_vectors(&shadow, Cpu::Unknown).unwrap_err();
        assert!(matches!(err, Error::UnknownCpu));
    }

    #[test]
    fn rejects_nonzero_low_memory() {
        let mut shadow = vec![0u8; SHADOW_LEN];
        shadow[0x1000] = 0x01;
        let err = validate_low_memory(&shadow).unwrap_err();
        assert!(matches!(err, Error::InvalidUpdateImage(_)));
    }

    #[test]
    fn accepts_all_zero_low_memory() {
        let shadow = vec![0u8; SHADOW_LEN];
        validate_low_memory(&shadow).unwrap();
    }

    #[test]
    fn build_shadow_places_records_at_absolute_addresses() {
        let records = vec![DataBlock::new(0xF000, vec![0xAB, 0xCD])];
        let shadow = build_shadow(&records).unwrap();
        assert_eq!(shadow[0xF000], 0xAB);
        assert_eq!(shadow[0xF001], 0xCD);
    }
}
