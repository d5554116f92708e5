//! Mode orchestrator
//!
//! One file per mode group, each taking the same `OrchestratorCtx` and
//! returning `Result<(), Error>`, dispatched through a single flat `Mode`
//! enum rather than per-operation clap subcommands.

pub mod execute;
pub mod flash_ctl;
pub mod flash_write;
pub mod raw;
pub mod read;
pub mod sync;
pub mod update;
pub mod write;

use crate::board_info::BoardInfo;
use crate::error::Error;
use crate::framer::CommandFramer;
use crate::image::ProgramImage;
use crate::parsers::zrecord::ZRecord;
use crate::serial::Transport;

/// The selected operation (`sync` is reached via `-s/--sync` instead,
/// see `reset::manual_sync_delay`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    Raw,
    Read,
    Write,
    Clear,
    Check,
    Execute,
    Update,
}

/// Everything a mode might need beyond the open framer/board info, bundled
/// once by the top-level driver instead of threaded as a dozen loose
/// arguments.
#[derive(Debug, Default)]
pub struct RunOptions {
    pub flash: bool,
    pub execute_after: bool,
    pub address: Option<u32>,
    pub length: Option<u32>,
    pub hex_string: Option<String>,
    pub image: Option<ProgramImage>,
    /// Raw, uncoalesced Z-record stream, required by `write --flash` and
    /// `update`, which both bypass the coalesced `ProgramImage`.
    pub zrecord: Option<(u32, Vec<ZRecord>)>,
}

/// Bundles the open transport and the already-decoded board identity,
/// threaded explicitly through each mode rather than stored in a global.
pub struct OrchestratorCtx<'a, T: Transport> {
    pub framer: &'a mut CommandFramer<T>,
    pub board_info: Option<BoardInfo>,
}

pub fn run_mode<T: Transport>(
    ctx: &mut OrchestratorCtx<T>,
    mode: Mode,
    opts: &RunOptions,
) -> Result<(), Error> {
    match mode {
        Mode::Raw => raw::run(ctx, opts),
        Mode::Read => read::run(ctx, opts),
        Mode::Write => write::run(ctx, opts),
        Mode::Clear => flash_ctl::clear(ctx),
        Mode::Check => flash_ctl::check(ctx),
        Mode::Execute => execute::run(ctx, opts),
        Mode::Update => update::run(ctx, opts),
    }
}
