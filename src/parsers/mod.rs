//! Object-file parsers
//!
//! Three format decoders producing the uniform [`ProgramImage`](crate::image::ProgramImage),
//! dispatched through a tagged variant with one `parse` method per format.

pub mod intelhex;
pub mod raw;
pub mod zrecord;

use crate::error::Error;
use crate::image::ProgramImage;

/// Options a parser may need beyond the raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// `--address`, used only by the raw-binary parser's first block.
    pub start_address: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Binary,
    ZRecord,
    IntelHex,
}

impl Format {
    /// Select a format from the file extension and first byte.
    pub fn detect(extension: Option<&str>, first_byte: Option<u8>) -> Result<Self, Error> {
        if matches!(extension, Some("bin") | Some("out")) {
            return Ok(Format::Binary);
        }

        match first_byte {
            Some(0x5A) => Ok(Format::ZRecord),
            Some(0x3A) => Ok(Format::IntelHex),
            _ => Err(Error::UnrecognizedFormat),
        }
    }

    pub fn parse(&self, bytes: &[u8], opts: &ParseOptions) -> Result<ProgramImage, Error> {
        match self {
            Format::Binary => raw::parse(bytes, opts),
            Format::ZRecord => zrecord::parse(bytes),
            Format::IntelHex => intelhex::parse(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_binary_by_extension() {
        assert_eq!(Format::detect(Some("bin"), Some(0x3A)).unwrap(), Format::Binary);
        assert_eq!(Format::detect(Some("out"), None).unwrap(), Format::Binary);
    }

    #[test]
    fn detects_by_leading_byte_when_extension_unknown() {
        assert_eq!(Format::detect(Some("hex"), Some(0x5A)).unwrap(), Format::ZRecord);
        assert_eq!(Format::detect(None, Some(0x3A)).unwrap(), Format::IntelHex);
    }

    #[test]
    fn unrecognized_when_neither_matches() {
        assert!(Format::detect(Some("txt"), Some(0x00)).is_err());
    }
}
