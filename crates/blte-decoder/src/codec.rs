use std::io::Read;

use flate2::read::DeflateDecoder;

use crate::error::CodecError;

pub use blte_wire::BlockEncoding;

/// Default upper bound on a single decoded block (256 MiB).
///
/// Stored blocks are already bounded by their encoded size; the limit
/// only matters for deflate, where a small payload can inflate without
/// bound.
pub const MAX_DECODED_BLOCK_SIZE: usize = 256 * 1024 * 1024;

/// Decode one block's encoded bytes (tag byte + payload).
///
/// ```text
/// raw:  [tag][payload ...............]
///         │
///         ├─ 'N' → payload, unchanged
///         ├─ 'Z' → raw inflate(payload)
///         └─ ..  → CodecError::UnknownEncoding { tag }
/// ```
///
/// Pure: no stream access and no retained state. Uses the default
/// [`MAX_DECODED_BLOCK_SIZE`] limit.
///
/// # Errors
///
/// - [`CodecError::EmptyBlock`] if `raw` is empty.
/// - [`CodecError::UnknownEncoding`] for any tag other than `N` or `Z`.
/// - [`CodecError::InflateFailed`] if the deflate stream is malformed.
/// - [`CodecError::DecompressionBomb`] if inflating exceeds the limit.
pub fn decode_block(raw: &[u8]) -> Result<Vec<u8>, CodecError> {
    decode_block_with_limit(raw, MAX_DECODED_BLOCK_SIZE)
}

/// Same as [`decode_block`], with an explicit decompression limit.
///
/// # Errors
///
/// See [`decode_block`].
pub fn decode_block_with_limit(raw: &[u8], limit: usize) -> Result<Vec<u8>, CodecError> {
    let (&tag, payload) = raw.split_first().ok_or(CodecError::EmptyBlock)?;

    match BlockEncoding::from_tag(tag) {
        Some(BlockEncoding::Stored) => Ok(payload.to_vec()),
        Some(BlockEncoding::Deflate) => inflate_raw(payload, limit),
        None => Err(CodecError::UnknownEncoding { tag }),
    }
}

/// Inflate a raw deflate stream (no zlib header or adler32 trailer).
///
/// Reads at most `limit + 1` bytes of output so an oversized stream is
/// detected without inflating all of it.
fn inflate_raw(payload: &[u8], limit: usize) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    DeflateDecoder::new(payload)
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| CodecError::InflateFailed(e.to_string()))?;

    if out.len() > limit {
        return Err(CodecError::DecompressionBomb { limit });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::DeflateEncoder;

    use super::*;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn block(tag: u8, payload: &[u8]) -> Vec<u8> {
        let mut raw = vec![tag];
        raw.extend_from_slice(payload);
        raw
    }

    #[test]
    fn stored_is_identity() {
        let payload = b"\x00\x01binary\xffpayload";
        assert_eq!(decode_block(&block(b'N', payload)).unwrap(), payload);
    }

    #[test]
    fn stored_empty_payload() {
        assert!(decode_block(b"N").unwrap().is_empty());
    }

    #[test]
    fn deflate_roundtrip() {
        let plain = "the quick brown fox jumps over the lazy dog\n".repeat(40);
        let raw = block(b'Z', &deflate(plain.as_bytes()));
        assert_eq!(decode_block(&raw).unwrap(), plain.as_bytes());
    }

    #[test]
    fn deflate_is_raw_not_zlib_wrapped() {
        // A zlib stream opens with a 0x78 CMF byte and ends with adler32;
        // the raw stream the codec expects has neither.
        let compressed = deflate(b"xyz");
        assert_ne!(compressed[0], 0x78);
        assert_eq!(decode_block(&block(b'Z', &compressed)).unwrap(), b"xyz");
    }

    #[test]
    fn malformed_deflate_is_codec_error() {
        // BFINAL=1, BTYPE=11 (reserved): invalid on the first block header
        let raw = block(b'Z', &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(matches!(
            decode_block(&raw),
            Err(CodecError::InflateFailed(_))
        ));
    }

    #[test]
    fn unknown_tag_names_the_byte() {
        for payload in [&b""[..], b"anything", b"\x78\x9c"] {
            let result = decode_block(&block(b'X', payload));
            assert!(matches!(
                result,
                Err(CodecError::UnknownEncoding { tag: b'X' })
            ));
        }
    }

    #[test]
    fn empty_block_has_no_tag() {
        assert!(matches!(decode_block(&[]), Err(CodecError::EmptyBlock)));
    }

    #[test]
    fn decompression_limit_enforced() {
        let plain = vec![b'a'; 10_000];
        let raw = block(b'Z', &deflate(&plain));
        assert!(matches!(
            decode_block_with_limit(&raw, 100),
            Err(CodecError::DecompressionBomb { limit: 100 })
        ));
        assert_eq!(decode_block_with_limit(&raw, 10_000).unwrap().len(), 10_000);
    }
}
