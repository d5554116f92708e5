//! Z-record parser
//!
//! Identified by a leading `0x5A` ('Z') byte. After discarding it, the
//! remaining bytes are a 3-byte LE execute address followed by zero or
//! more `{address(3 LE), length(3 LE), data(length bytes)}` records,
//! terminated by a record whose length is zero. Records are appended in
//! order; this format never coalesces.

use crate::endian::le_bytes_to_uint;
use crate::error::Error;
use crate::image::{DataBlock, ProgramImage};

/// A single decoded record, before any higher-level image assembly. The
/// flash-write mode consumes this raw stream directly instead of
/// the coalesced [`ProgramImage`].
pub type ZRecord = DataBlock;

const LEN_FIELD: usize = 3;
const ADDR_FIELD: usize = 3;

/// Parse the raw record stream: the leading execute address and the
/// ordered list of records up to (not including) the zero-length
/// terminator.
pub fn parse_records(bytes: &[u8]) -> Result<(u32, Vec<ZRecord>), Error> {
    if bytes.is_empty() || bytes[0] != 0x5A {
        return Err(Error::UnrecognizedFormat);
    }

    let mut cursor = &bytes[1..];
    let entry = take_le(&mut cursor, ADDR_FIELD)?;

    let mut records = Vec::new();
    loop {
        let address = take_le(&mut cursor, ADDR_FIELD)?;
        let length = take_le(&mut cursor, LEN_FIELD)? as usize;
        if length == 0 {
            break;
        }
        if cursor.len() < length {
            return Err(Error::UnrecognizedFormat);
        }
        let data = cursor[..length].to_vec();
        cursor = &cursor[length..];
        records.push(ZRecord::new(address, data));
    }

    Ok((entry as u32, records))
}

/// Parse into the uniform [`ProgramImage`]. Z-record blocks are never
/// coalesced.
pub fn parse(bytes: &[u8]) -> Result<ProgramImage, Error> {
    let (entry, records) = parse_records(bytes)?;
    Ok(ProgramImage {
        entry: Some(entry),
        blocks: records,
    })
}

fn take_le(cursor: &mut &[u8], width: usize) -> Result<u64, Error> {
    if cursor.len() < width {
        return Err(Error::UnrecognizedFormat);
    }
    let value = le_bytes_to_uint(&cursor[..width]);
    *cursor = &cursor[width..];
    Ok(value)
}
