//! CLI argument parsing
//!
//! One flat options struct with a global verbosity counter, dispatched on
//! `--mode` rather than per-operation subcommands.

use clap::Parser;
use std::path::PathBuf;
use wdc_uploader::modes::Mode;

#[derive(Parser)]
#[command(name = "wdc-uploader")]
#[command(author, version, about = "Firmware uploader for the WDC 65C02/65C816 bootloader family", long_about = None)]
pub struct Cli {
    /// Path to the program image (required for write/update)
    pub filename: Option<PathBuf>,

    /// Baud rate
    #[arg(short, long, default_value_t = wdc_uploader::serial::DEFAULT_BAUD)]
    pub baudrate: u32,

    /// Serial device path; if absent, pick interactively from an enumerated list
    #[arg(short, long)]
    pub device: Option<String>,

    /// Address in six hex digits, e.g. 00ABCD; upper byte must be zero
    #[arg(short, long)]
    pub address: Option<String>,

    /// Length, required for read mode
    #[arg(short, long)]
    pub length: Option<u32>,

    /// Mode of operation
    #[arg(short, long, value_enum)]
    pub mode: Mode,

    /// Select the flash variant of the mode instead of memory
    #[arg(short = 'k', long)]
    pub flash: bool,

    /// After write, jump to the entry address
    #[arg(short = 'x', long)]
    pub execute: bool,

    /// Skip the DTR reset pulse
    #[arg(short = 'r', long = "no-reset")]
    pub no_reset: bool,

    /// Manual sync delay in seconds before the first SYNC command
    #[arg(short = 's', long, num_args = 0..=1, default_missing_value = "4")]
    pub sync: Option<u64>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Raw hex byte string, required for raw mode, e.g. "55 AA 00 20"
    #[arg(long)]
    pub hex_string: Option<String>,
}
