//! wdc-uploader - firmware uploader for the WDC 65C02/65C816 bootloader family
//!
//! Thin CLI binary: parses arguments, opens the serial device, runs the
//! reset/sync/board-info sequence, then hands off to the mode orchestrator.

mod cli;

use clap::Parser;
use cli::Cli;
use std::io::Write;
use wdc_uploader::board_info::{decode_board_info, BoardInfo};
use wdc_uploader::endian::parse_hex_address;
use wdc_uploader::error::Error;
use wdc_uploader::framer::{CommandFramer, CommandResponse, ProtocolCommand};
use wdc_uploader::modes::{self, run_mode, Mode, OrchestratorCtx, RunOptions};
use wdc_uploader::parsers::{self, Format, ParseOptions};
use wdc_uploader::reset;
use wdc_uploader::serial::SerialChannel;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.verbose {
        0 => {}
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let device = match &cli.device {
        Some(device) => device.clone(),
        None => select_device_interactively()?,
    };

    let mut channel = SerialChannel::open(&device, cli.baudrate)?;
    reset::reset_pulse(&mut channel, cli.no_reset)?;

    let mut framer = CommandFramer::new(channel);

    if let Some(seconds) = cli.sync {
        let mut ctx = OrchestratorCtx {
            framer: &mut framer,
            board_info: None,
        };
        modes::sync::run(&mut ctx, seconds)?;
    }

    // Raw mode is the low-level escape hatch that bypasses the framed
    // command protocol entirely; probing BOARD_INFO first would consume
    // board bytes ahead of the raw exchange and can abort on an echo that
    // was never meant to be read as one.
    let board_info = if cli.mode == Mode::Raw {
        None
    } else {
        probe_board_info(&mut framer, cli.mode)?
    };

    let opts = build_run_options(&cli)?;
    let mut ctx = OrchestratorCtx {
        framer: &mut framer,
        board_info,
    };
    run_mode(&mut ctx, cli.mode, &opts)
}

/// Reads and decodes `BOARD_INFO`. A decode failure is a warning for every
/// mode except `update`, where CPU identification is mandatory.
fn probe_board_info(
    framer: &mut CommandFramer<SerialChannel>,
    mode: Mode,
) -> Result<Option<BoardInfo>, Error> {
    let response = match framer.send_command(ProtocolCommand::BoardInfo)? {
        CommandResponse::BoardInfo(bytes) => decode_board_info(&bytes),
        _ => None,
    };

    match (&response, mode) {
        (Some(info), _) => {
            println!("Board Type: {:?}", info.family);
            println!(
                "CPU Type: {:?} - Hardware version: {}, Software Version: {}",
                info.cpu, info.hw_version, info.sw_version
            );
        }
        (None, Mode::Update) => return Err(Error::UnknownBoard),
        (None, _) => eprintln!("warning: unable to get board info"),
    }

    Ok(response)
}

fn build_run_options(cli: &Cli) -> Result<RunOptions, Error> {
    let address = cli
        .address
        .as_deref()
        .map(|text| {
            parse_hex_address(text)
                .map(|le| le[0] as u32 | (le[1] as u32) << 8 | (le[2] as u32) << 16)
        })
        .transpose()?;

    let mut opts = RunOptions {
        flash: cli.flash,
        execute_after: cli.execute,
        address,
        length: cli.length,
        hex_string: cli.hex_string.clone(),
        image: None,
        zrecord: None,
    };

    if let Some(path) = &cli.filename {
        let bytes = std::fs::read(path).map_err(|source| Error::FileReadFailed {
            path: path.display().to_string(),
            source,
        })?;

        let needs_raw_records =
            matches!(cli.mode, Mode::Write if cli.flash) || cli.mode == Mode::Update;
        if needs_raw_records {
            opts.zrecord = Some(parsers::zrecord::parse_records(&bytes)?);
        } else {
            let extension = path.extension().and_then(|e| e.to_str());
            let format = Format::detect(extension, bytes.first().copied())?;
            let parse_opts = ParseOptions {
                start_address: address,
            };
            opts.image = Some(format.parse(&bytes, &parse_opts)?);
        }
    }

    Ok(opts)
}

/// Enumerate available serial ports and prompt the operator to pick one,
/// listing ports and prompting on stdin for an index.
fn select_device_interactively() -> Result<String, Error> {
    let ports = SerialChannel::list_ports();
    if ports.is_empty() {
        return Err(Error::MissingArgument("--device (no serial ports found)"));
    }

    println!("Available serial ports:");
    for (i, port) in ports.iter().enumerate() {
        println!("  [{i}] {port}");
    }
    print!("Select a port: ");
    std::io::stdout().flush().ok();

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(Error::StdinReadFailed)?;

    let index: usize = line
        .trim()
        .parse()
        .map_err(|_| Error::MissingArgument("--device"))?;
    ports
        .get(index)
        .cloned()
        .ok_or(Error::MissingArgument("--device"))
}
