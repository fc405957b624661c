use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;

/// Default deflate level (0–9 scale), matching zlib's default.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Compress `data` as a raw deflate stream: no zlib header and no
/// adler32 trailer, which is what a `Z` block carries after its tag.
///
/// # Example
///
/// ```rust
/// use blte_encoder::compression::{deflate_raw, DEFAULT_COMPRESSION_LEVEL};
///
/// let data = "fn main() { }\n".repeat(100);
/// let compressed = deflate_raw(data.as_bytes(), DEFAULT_COMPRESSION_LEVEL).unwrap();
/// assert!(compressed.len() < data.len());
/// ```
///
/// # Errors
///
/// Returns the underlying I/O error if the deflate writer fails. Writing
/// into a `Vec` does not fail in practice.
pub fn deflate_raw(data: &[u8], level: u32) -> std::io::Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::DeflateDecoder;

    use super::*;

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        DeflateDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn roundtrip_through_raw_inflate() {
        let data = "pub fn hello() -> &'static str { \"world\" }\n".repeat(50);
        let compressed = deflate_raw(data.as_bytes(), DEFAULT_COMPRESSION_LEVEL).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(inflate(&compressed), data.as_bytes());
    }

    #[test]
    fn level_zero_still_produces_valid_stream() {
        let compressed = deflate_raw(b"abc123", 0).unwrap();
        assert_eq!(inflate(&compressed), b"abc123");
    }

    #[test]
    fn out_of_range_level_is_clamped() {
        let compressed = deflate_raw(b"clamped", 42).unwrap();
        assert_eq!(inflate(&compressed), b"clamped");
    }

    #[test]
    fn empty_input() {
        let compressed = deflate_raw(b"", DEFAULT_COMPRESSION_LEVEL).unwrap();
        assert!(inflate(&compressed).is_empty());
    }
}
