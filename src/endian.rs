//! Byte-order helpers
//!
//! The bootloader wire protocol pushes every multi-byte field little-endian,
//! least-significant byte first. Big-endian is display-only (diagnostic
//! printing), never transmitted.

use crate::error::Error;

/// Interpret `bytes` as little-endian unsigned, least-significant byte first.
pub fn le_bytes_to_uint(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// Produce exactly `width` octets of `value`, LSB first, zero-padded high.
pub fn uint_to_le_bytes(value: u64, width: usize) -> Vec<u8> {
    (0..width).map(|i| ((value >> (8 * i)) & 0xFF) as u8).collect()
}

/// Big-endian counterpart of [`uint_to_le_bytes`], used only for display.
pub fn uint_to_be_bytes(value: u64, width: usize) -> Vec<u8> {
    let mut bytes = uint_to_le_bytes(value, width);
    bytes.reverse();
    bytes
}

/// Parse a six-hex-digit address string (`BBAAAA`) into a 3-byte LE tuple.
///
/// The upper byte must be zero, so the effective address is at most
/// `0xFFFF`. Any input that is not exactly six hex digits fails.
pub fn parse_hex_address(text: &str) -> Result<[u8; 3], Error> {
    if text.len() != 6 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidAddress(text.to_string()));
    }

    let value = u32::from_str_radix(text, 16).map_err(|_| Error::InvalidAddress(text.to_string()))?;
    let bytes = [
        (value & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        ((value >> 16) & 0xFF) as u8,
    ];

    if bytes[2] != 0 {
        return Err(Error::InvalidAddress(text.to_string()));
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn le_round_trip() {
        for width in 1..=4usize {
            let max = if width == 4 { u32::MAX as u64 } else { (1u64 << (8 * width)) - 1 };
            for n in [0u64, 1, max / 2, max] {
                let bytes = uint_to_le_bytes(n, width);
                assert_eq!(le_bytes_to_uint(&bytes), n);
            }
        }
    }

    #[test]
    fn be_is_reverse_of_le() {
        let le = uint_to_le_bytes(0x00ABCD, 3);
        let be = uint_to_be_bytes(0x00ABCD, 3);
        assert_eq!(le, vec![0xCD, 0xAB, 0x00]);
        assert_eq!(be, vec![0x00, 0xAB, 0xCD]);
    }

    #[test]
    fn address_parses_example() {
        assert_eq!(parse_hex_address("00ABCD").unwrap(), [0xCD, 0xAB, 0x00]);
    }

    #[test]
    fn address_rejects_nonzero_upper_byte() {
        assert!(parse_hex_address("010000").is_err());
    }

    #[test]
    fn address_rejects_wrong_length() {
        assert!(parse_hex_address("ABCD").is_err());
        assert!(parse_hex_address("0ABCDEF").is_err());
    }

    #[test]
    fn address_rejects_non_hex() {
        assert!(parse_hex_address("00ZZZZ").is_err());
    }
}
