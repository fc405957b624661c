//! MD5 helpers for header and block verification.
//!
//! Digests are compared as raw bytes where both sides are raw, and as
//! case-insensitive hex where one side comes from the caller as a string.

use blte_wire::{BlteHeader, WireError};

/// MD5 of `data`, as lowercase hex.
#[must_use]
pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(md5::compute(data).0)
}

/// MD5 over several slices as if they were one contiguous buffer.
#[must_use]
pub fn md5_hex_parts(parts: &[&[u8]]) -> String {
    let mut ctx = md5::Context::new();
    for part in parts {
        ctx.consume(part);
    }
    hex::encode(ctx.compute().0)
}

/// Case-insensitive comparison of two hex digests.
#[must_use]
pub fn hex_matches(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual)
}

/// Header checksum of an in-memory container: MD5 over the first
/// `header_size` bytes. This is the value a caller passes as the expected
/// hash when verification is enabled.
///
/// # Errors
///
/// Returns a [`WireError`] if the fixed header is invalid or `container`
/// is shorter than the header it declares.
pub fn header_checksum(container: &[u8]) -> Result<String, WireError> {
    let header = BlteHeader::read_from(container)?;
    let header_bytes = container
        .get(..header.header_size as usize)
        .ok_or(WireError::UnexpectedEof {
            offset: container.len(),
        })?;
    Ok(md5_hex(header_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_of_empty_input() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn parts_hash_like_concatenation() {
        assert_eq!(
            md5_hex_parts(&[b"BLTE", b"\x00\x00\x00\x24", b"\x0f"]),
            md5_hex(b"BLTE\x00\x00\x00\x24\x0f")
        );
    }

    #[test]
    fn hex_comparison_ignores_case() {
        assert!(hex_matches(
            "D41D8CD98F00B204E9800998ECF8427E",
            "d41d8cd98f00b204e9800998ecf8427e"
        ));
        assert!(!hex_matches("d41d", "d41e"));
    }

    #[test]
    fn header_checksum_requires_full_header() {
        let mut container = b"BLTE".to_vec();
        container.extend_from_slice(&36i32.to_be_bytes());
        container.push(0x0F);
        let result = header_checksum(&container);
        assert!(matches!(result, Err(WireError::UnexpectedEof { offset: 9 })));
    }
}
