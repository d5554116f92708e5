//! Raw binary parser
//!
//! The entire file is opaque data; the consumer (the `--address` CLI
//! option) supplies the start address. No format-specific framing exists
//! to autodetect, so this parser never fails on content — only the
//! surrounding `Format::detect` dispatch can reject a file.

use super::ParseOptions;
use crate::error::Error;
use crate::image::{DataBlock, ProgramImage};

/// Maximum bytes per block; chosen to stay well under typical bootloader
/// RAM buffer sizes.
const MAX_BLOCK_LEN: usize = 1023;

/// Split `bytes` into contiguous blocks of at most [`MAX_BLOCK_LEN`] bytes.
/// The first block starts at `opts.start_address` (or zero); later blocks
/// are contiguous with it. The entry point is the starting address.
pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ProgramImage, Error> {
    let start = opts.start_address.unwrap_or(0);

    let blocks: Vec<DataBlock> = bytes
        .chunks(MAX_BLOCK_LEN)
        .scan(start, |addr, chunk| {
            let block = DataBlock::new(*addr, chunk.to_vec());
            *addr += chunk.len() as u32;
            Some(block)
        })
        .collect();

    Ok(ProgramImage {
        entry: Some(start),
        blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_address_zero() {
        let image = parse(&[1, 2, 3], &ParseOptions::default()).unwrap();
        assert_eq!(image.entry, Some(0));
        assert_eq!(image.blocks[0].address, 0);
    }

    #[test]
    fn uses_supplied_start_address() {
        let opts = ParseOptions {
            start_address: Some(0x8000),
        };
        let image = parse(&[1, 2, 3], &opts).unwrap();
        assert_eq!(image.entry, Some(0x8000));
        assert_eq!(image.blocks[0].address, 0x8000);
    }

    #[test]
    fn splits_into_contiguous_blocks_of_max_len() {
        let data = vec![0xAAu8; MAX_BLOCK_LEN * 2 + 10];
        let image = parse(&data, &ParseOptions::default()).unwrap();
        assert_eq!(image.blocks.len(), 3);
        assert_eq!(image.blocks[0].address, 0);
        assert_eq!(image.blocks[1].address, MAX_BLOCK_LEN as u32);
        assert_eq!(image.blocks[2].address, (MAX_BLOCK_LEN * 2) as u32);
        assert_eq!(image.blocks[2].length(), 10);
        assert_eq!(image.total_len(), data.len());
    }
}
