//! Core library for the WDC 65C02/65C816 bootloader uploader.
//!
//! Three tightly coupled subsystems: object-file parsers translating raw
//! binary, Z-record, and Intel HEX into a uniform [`image::ProgramImage`];
//! the wire-protocol [`framer::CommandFramer`] that frames commands over a
//! [`serial::Transport`]; and the [`modes`] orchestrator that sequences
//! multi-step operations like flash write and firmware self-update. The
//! CLI binary (`main.rs`) is a thin adapter over this library.

pub mod board_info;
pub mod endian;
pub mod error;
pub mod framer;
pub mod image;
pub mod modes;
pub mod parsers;
pub mod reset;
pub mod serial;
