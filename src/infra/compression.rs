//! Zlib compression and decompression utilities.

use crate::error::{Error, Result};

/// Compresses data using zlib at the default level.
pub fn compress(data: &[u8]) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(data, 6)
}

/// Decompresses zlib-compressed data.
///
/// Validates the two-byte zlib header before inflating so that corrupt
/// object files fail with `Error::DecompressionFailed` rather than
/// producing garbage.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 2 || !is_valid_zlib_header(data[0], data[1]) {
        return Err(Error::DecompressionFailed);
    }

    miniz_oxide::inflate::decompress_to_vec_zlib(data).map_err(|_| Error::DecompressionFailed)
}

/// Checks the CMF/FLG pair: DEFLATE method, window size <= 7,
/// and (CMF * 256 + FLG) divisible by 31.
fn is_valid_zlib_header(cmf: u8, flg: u8) -> bool {
    if cmf & 0x0F != 8 {
        return false;
    }
    if (cmf >> 4) > 7 {
        return false;
    }
    ((cmf as u16) * 256 + flg as u16) % 31 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    // C-001: roundtrip preserves content
    #[test]
    fn test_compress_roundtrip() {
        let original = b"Hello, World! This is a test of compression.";
        let compressed = compress(original);
        let decompressed = decompress(&compressed).expect("decompression should succeed");
        assert_eq!(decompressed, original);
    }

    // C-002: empty payload roundtrips
    #[test]
    fn test_compress_empty() {
        let compressed = compress(b"");
        let decompressed = decompress(&compressed).expect("decompression should succeed");
        assert!(decompressed.is_empty());
    }

    // C-003: corrupted data is rejected
    #[test]
    fn test_decompress_corrupted_data() {
        let mut compressed = compress(b"Hello, World!");
        compressed[4] ^= 0xFF;
        compressed[5] ^= 0xFF;
        let result = decompress(&compressed);
        assert!(matches!(result, Err(Error::DecompressionFailed)));
    }

    // C-004: empty and truncated inputs are rejected
    #[test]
    fn test_decompress_truncated() {
        assert!(matches!(decompress(&[]), Err(Error::DecompressionFailed)));
        assert!(matches!(decompress(&[0x78]), Err(Error::DecompressionFailed)));

        let compressed = compress(b"Hello, World!");
        let half = &compressed[..compressed.len() / 2];
        assert!(matches!(decompress(half), Err(Error::DecompressionFailed)));
    }

    // C-005: header validation
    #[test]
    fn test_is_valid_zlib_header() {
        assert!(is_valid_zlib_header(0x78, 0x9C));
        assert!(is_valid_zlib_header(0x78, 0x01));
        assert!(is_valid_zlib_header(0x78, 0xDA));

        assert!(!is_valid_zlib_header(0x00, 0x00)); // method != 8
        assert!(!is_valid_zlib_header(0x88, 0x00)); // window too large
        assert!(!is_valid_zlib_header(0x78, 0x00)); // bad check value
    }

    // C-006: repetitive data actually compresses
    #[test]
    fn test_compress_reduces_size() {
        let original = vec![b'a'; 1000];
        let compressed = compress(&original);
        assert!(compressed.len() < original.len());
    }
}
