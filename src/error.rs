//! Error types for the uploader

use thiserror::Error;

/// Errors produced while parsing object files, driving the wire protocol,
/// or sequencing a mode.
#[derive(Debug, Error)]
pub enum Error {
    // --- Input validation (fail before any device I/O) ---
    /// File extension and leading byte matched none of the known formats
    #[error("unrecognized object file format")]
    UnrecognizedFormat,

    /// Intel HEX record checksum did not match
    #[error("Intel HEX checksum mismatch: expected 0x{expected:02X}, computed 0x{computed:02X}")]
    ChecksumError { expected: u8, computed: u8 },

    /// Intel HEX record type other than 0 (data) or 1 (EOF)
    #[error("unsupported Intel HEX record type 0x{0:02X}")]
    UnsupportedHexRecord(u8),

    /// `--address` was not six hex digits, or its upper byte was nonzero
    #[error("invalid address string {0:?}")]
    InvalidAddress(String),

    /// Update image failed the pre-transmission validation
    #[error("invalid update image: {0}")]
    InvalidUpdateImage(&'static str),

    /// Flash-write image failed the shadow-buffer assembly checks
    #[error("invalid flash image: {0}")]
    InvalidFlashImage(&'static str),

    /// A mode-specific required option was absent (e.g. `--hex-string` for `raw`)
    #[error("missing required option: {0}")]
    MissingArgument(&'static str),

    // --- Transport ---
    /// Could not open the serial device
    #[error("failed to open serial port {device}: {source}")]
    SerialOpenFailed {
        device: String,
        #[source]
        source: serialport::Error,
    },

    /// A read did not complete in the allotted time
    #[error("serial read timed out")]
    SerialReadTimeout,

    /// The underlying serial I/O returned an error while draining a response
    #[error("serial read failed: {0}")]
    SerialReadFailed(std::io::Error),

    /// The underlying serial I/O returned an error on write
    #[error("serial write failed: {0}")]
    SerialWriteFailed(#[from] std::io::Error),

    /// Reading an operator prompt from stdin failed
    #[error("failed to read operator input: {0}")]
    StdinReadFailed(std::io::Error),

    // --- Protocol ---
    /// Echo byte following the `55 AA` preamble was not `CC`
    #[error("protocol desync: expected echo byte 0xCC, got 0x{0:02X}")]
    ProtocolDesync(u8),

    /// A WRITE_MEM/WRITE_FLASH status byte was not 0x00
    #[error("write failed, board returned status 0x{0:02X}")]
    WriteFailed(u8),

    /// A READ_MEM/READ_FLASH response could not be completed
    #[error("read failed")]
    ReadFailed,

    /// The board rejected the UPDATE handshake at some phase
    #[error("cannot update, board returned status 0x{0:02X}")]
    CannotUpdate(u8),

    /// The final flash-update confirmation did not report success
    #[error("board reported bad flash status 0x{0:02X} during update; board may be in an inconsistent state")]
    BadFlash(u8),

    // --- Identity ---
    /// `BOARD_INFO` could not be decoded at all, and `update` requires a
    /// known board identity before it will touch the bootloader region
    #[error("unknown board identity, cannot safely perform update")]
    UnknownBoard,

    /// CPU family byte did not match any known value, and `update` requires
    /// it to pick the right set of interrupt vectors to validate
    #[error("unknown board CPU, cannot safely perform update")]
    UnknownCpu,

    // --- Operator ---
    /// Operator declined the update confirmation prompt
    #[error("update aborted by operator")]
    UserAborted,

    // --- Misc I/O ---
    /// Reading the input object file failed
    #[error("failed to read {path}: {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
