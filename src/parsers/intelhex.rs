//! Intel HEX parser
//!
//! Identified by a leading `:` byte. Each line is `:BBAAAATT<data>CK` in
//! ASCII hex; `BB` is the data byte count, `AAAA` a 16-bit big-endian
//! address, `TT` a record type, and `CK` a checksum covering every field
//! but itself. Only record types 0 (data) and 1 (EOF) are recognized.
//! Unlike Z-record, adjacent blocks are coalesced after parsing.

use crate::error::Error;
use crate::image::{DataBlock, ProgramImage};

const RECORD_DATA: u8 = 0x00;
const RECORD_EOF: u8 = 0x01;

pub fn parse(bytes: &[u8]) -> Result<ProgramImage, Error> {
    let text = std::str::from_utf8(bytes).map_err(|_| Error::UnrecognizedFormat)?;

    let mut entry = None;
    let mut blocks = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(rest) = line.strip_prefix(':') else {
            return Err(Error::UnrecognizedFormat);
        };

        let record_bytes = decode_hex_pairs(rest)?;
        if record_bytes.len() < 5 {
            return Err(Error::UnrecognizedFormat);
        }

        let byte_count = record_bytes[0] as usize;
        let address = u16::from_be_bytes([record_bytes[1], record_bytes[2]]);
        let record_type = record_bytes[3];
        let expected_len = 4 + byte_count + 1;
        if record_bytes.len() != expected_len {
            return Err(Error::UnrecognizedFormat);
        }

        let data = &record_bytes[4..4 + byte_count];
        let checksum = record_bytes[4 + byte_count];
        let computed = calc_checksum(&record_bytes[..4 + byte_count]);
        if computed != checksum {
            return Err(Error::ChecksumError {
                expected: checksum,
                computed,
            });
        }

        match record_type {
            RECORD_DATA => {
                let block = DataBlock::new(address as u32, data.to_vec());
                if entry.is_none() {
                    entry = Some(block.address);
                }
                blocks.push(block);
            }
            RECORD_EOF => break,
            other => return Err(Error::UnsupportedHexRecord(other)),
        }
    }

    let mut image = ProgramImage { entry, blocks };
    image.coalesce();
    Ok(image)
}

/// Two's-complement checksum: the stored `CK` byte, when added to the sum
/// of every other field byte, makes the low byte of the total zero.
fn calc_checksum(fields: &[u8]) -> u8 {
    let sum = fields.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    sum.wrapping_sub(1) ^ 0xFF
}

fn decode_hex_pairs(text: &str) -> Result<Vec<u8>, Error> {
    let bytes = text.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(Error::UnrecognizedFormat);
    }
    bytes
        .chunks(2)
        .map(|pair| {
            let s = std::str::from_utf8(pair).map_err(|_| Error::UnrecognizedFormat)?;
            u8::from_str_radix(s, 16).map_err(|_| Error::UnrecognizedFormat)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_classic_worked_example() {
        let text = ":10010000214601360121470136007EFE09D2190140\n:00000001FF\n";
        let image = parse(text.as_bytes()).unwrap();
        assert_eq!(image.entry, Some(0x0100));
        assert_eq!(image.blocks.len(), 1);
        assert_eq!(image.blocks[0].address, 0x0100);
        assert_eq!(image.blocks[0].length(), 0x10);
        assert_eq!(
            image.blocks[0].data,
            vec![
                0x21, 0x46, 0x01, 0x36, 0x01, 0x21, 0x47, 0x01, 0x36, 0x00, 0x7E, 0xFE, 0x09,
                0xD2, 0x19, 0x01
            ]
        );
    }

    #[test]
    fn rejects_bad_checksum() {
        let text = ":10010000214601360121470136007EFE09D21901FF\n:00000001FF\n";
        let err = parse(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::ChecksumError { .. }));
    }

    #[test]
    fn rejects_unsupported_record_type() {
        let text = ":00000002FE\n";
        let err = parse(text.as_bytes()).unwrap_err();
        match err {
            Error::UnsupportedHexRecord(t) => assert_eq!(t, 0x02),
            other => panic!("expected UnsupportedHexRecord, got {other:?}"),
        }
    }

    #[test]
    fn coalesces_adjacent_records() {
        let text = ":02000000AABB99\n:020002001122C9\n:00000001FF\n";
        let image = parse(text.as_bytes()).unwrap();
        assert_eq!(image.blocks.len(), 1);
        assert_eq!(image.blocks[0].data, vec![0xAA, 0xBB, 0x11, 0x22]);
    }
}
